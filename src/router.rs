pub mod shell;
pub mod store;
pub mod view;

pub use shell::{AppShell, ProfileResolution, RenderedShell, ShellAction};
pub use store::ShellStore;
pub use view::{AuthMode, PaywallPresentation, Screen, View};
