// src/router/store.rs

use tokio::sync::watch;

use crate::router::shell::{AppShell, ShellAction};

/// Dono do `AppShell`. Quem precisa reagir a mudanças assina um `watch::Receiver`.
pub struct ShellStore {
    tx: watch::Sender<AppShell>,
}

impl ShellStore {
    pub fn new(shell: AppShell) -> Self {
        let (tx, _rx) = watch::channel(shell);
        Self { tx }
    }

    pub fn dispatch(&self, action: ShellAction) {
        tracing::debug!(?action, "shell");
        self.tx.send_modify(|shell| shell.apply(action));
    }

    pub fn subscribe(&self) -> watch::Receiver<AppShell> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> AppShell {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::view::View;
    use uuid::Uuid;

    #[tokio::test]
    async fn subscribers_see_every_dispatch() {
        let store = ShellStore::new(AppShell::local(Uuid::nil(), vec![]));
        let mut rx = store.subscribe();

        store.dispatch(ShellAction::Navigate(View::Leads));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().current_view(), View::Leads);
        assert_eq!(store.snapshot().current_view(), View::Leads);
    }
}
