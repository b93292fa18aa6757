// src/common/time.rs

//! Funções puras de data/hora. Nada aqui lê o relógio: quem chama passa o `now`.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Asia/Kolkata (UTC+05:30, sem horário de verão).
pub const IST_OFFSET_MINUTES: i32 = 330;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

// Horário padrão dos atalhos "amanhã" e "+3 dias".
const MORNING_SLOT_HOUR: i64 = 10;

/// Converte o offset configurado em um `FixedOffset`, caindo para IST se inválido.
pub fn business_offset(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .or_else(|| FixedOffset::east_opt(IST_OFFSET_MINUTES * 60))
        .unwrap_or_else(|| Utc.fix())
}

/// Data estritamente no passado em relação a `now`.
pub fn is_overdue(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    date < now
}

/// Mesmo dia de calendário, comparado no fuso do negócio (não em UTC).
pub fn is_same_business_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: &FixedOffset) -> bool {
    a.with_timezone(tz).date_naive() == b.with_timezone(tz).date_naive()
}

pub fn is_today(date: DateTime<Utc>, now: DateTime<Utc>, tz: &FixedOffset) -> bool {
    is_same_business_day(date, now, tz)
}

pub fn trial_expiry(created_at: DateTime<Utc>, trial_days: i64) -> DateTime<Utc> {
    created_at + Duration::days(trial_days)
}

/// `ceil((until - now) / 1 dia)`, nunca negativo.
pub fn days_left_until(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = (until - now).num_milliseconds();
    if remaining <= 0 {
        return 0;
    }
    (remaining + DAY_MILLIS - 1) / DAY_MILLIS
}

// --- ATALHOS DE AGENDAMENTO ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum QuickPreset {
    #[serde(rename = "2h")]
    InTwoHours,
    #[serde(rename = "tomorrow")]
    Tomorrow,
    #[serde(rename = "3d")]
    InThreeDays,
}

/// Data alvo de um atalho: agora + 2h, amanhã às 10:00 ou +3 dias às 10:00 (hora local).
pub fn quick_date(preset: QuickPreset, now: DateTime<Utc>, tz: &FixedOffset) -> DateTime<Utc> {
    let today = now.with_timezone(tz).date_naive();
    match preset {
        QuickPreset::InTwoHours => now + Duration::hours(2),
        QuickPreset::Tomorrow => morning_of(today + Duration::days(1), tz),
        QuickPreset::InThreeDays => morning_of(today + Duration::days(3), tz),
    }
}

fn morning_of(day: NaiveDate, tz: &FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::default()) + Duration::hours(MORNING_SLOT_HOUR);
    (local - Duration::seconds(i64::from(tz.local_minus_utc()))).and_utc()
}

// --- FORMATAÇÃO ---

/// Ex: "18 Oct 2026, 10:00 am"
pub fn format_date(date: DateTime<Utc>, tz: &FixedOffset) -> String {
    date.with_timezone(tz).format("%d %b %Y, %I:%M %P").to_string()
}

/// Valor compacto no sistema indiano: ₹1.2Cr, ₹45.0L, ₹12.5K, ₹950.
pub fn format_inr_compact(amount: Decimal) -> String {
    let value = amount.to_f64().unwrap_or(0.0);
    if value >= 10_000_000.0 {
        format!("₹{:.1}Cr", value / 10_000_000.0)
    } else if value >= 100_000.0 {
        format!("₹{:.1}L", value / 100_000.0)
    } else if value >= 1_000.0 {
        format!("₹{:.1}K", value / 1_000.0)
    } else {
        format!("₹{}", value.round())
    }
}

// --- LINKS DE SAÍDA ---

// Mesmo conjunto do encodeURIComponent: espaço vira %20, apóstrofo fica literal
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Deep link do WhatsApp: só os dígitos do telefone + mensagem padrão.
pub fn whatsapp_link(phone: &str, name: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let message = format!(
        "Hi {}, I'm following up regarding the property interest we discussed. When is a good time to chat?",
        name
    );
    format!("https://wa.me/{}?text={}", digits, utf8_percent_encode(&message, URI_COMPONENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ist() -> FixedOffset {
        business_offset(IST_OFFSET_MINUTES)
    }

    #[test]
    fn invalid_offset_falls_back_to_ist() {
        assert_eq!(business_offset(i32::MAX).local_minus_utc(), IST_OFFSET_MINUTES * 60);
        assert_eq!(business_offset(24 * 60).local_minus_utc(), IST_OFFSET_MINUTES * 60);
        assert_eq!(business_offset(-180).local_minus_utc(), -180 * 60);
    }

    #[test]
    fn overdue_is_strictly_before_now() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        assert!(is_overdue(now - Duration::seconds(1), now));
        assert!(!is_overdue(now, now));
        assert!(!is_overdue(now + Duration::minutes(5), now));
    }

    #[test]
    fn today_uses_ist_calendar_day() {
        // 2026-10-18 20:00 UTC já é 19/10 01:30 em IST
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 20, 0, 0).unwrap();
        let same_utc_day = Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap();
        let next_utc_day = Utc.with_ymd_and_hms(2026, 10, 19, 5, 0, 0).unwrap();

        assert!(!is_today(same_utc_day, now, &ist()));
        assert!(is_today(next_utc_day, now, &ist()));
    }

    #[test]
    fn days_left_rounds_up_and_floors_at_zero() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        assert_eq!(days_left_until(now + Duration::hours(1), now), 1);
        assert_eq!(days_left_until(now + Duration::days(2), now), 2);
        assert_eq!(days_left_until(now + Duration::days(2) + Duration::seconds(1), now), 3);
        assert_eq!(days_left_until(now, now), 0);
        assert_eq!(days_left_until(now - Duration::days(4), now), 0);
    }

    #[test]
    fn tomorrow_preset_is_ten_am_local() {
        // 23:00 IST do dia 18
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 17, 30, 0).unwrap();
        let date = quick_date(QuickPreset::Tomorrow, now, &ist());
        let local = date.with_timezone(&ist());

        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(local.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(date, Utc.with_ymd_and_hms(2026, 10, 19, 4, 30, 0).unwrap());
    }

    #[test]
    fn other_presets() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 6, 15, 0).unwrap();
        assert_eq!(quick_date(QuickPreset::InTwoHours, now, &ist()), now + Duration::hours(2));

        let three = quick_date(QuickPreset::InThreeDays, now, &ist()).with_timezone(&ist());
        assert_eq!(three.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
        assert_eq!(three.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn formats_in_ist() {
        let date = Utc.with_ymd_and_hms(2026, 10, 18, 4, 30, 0).unwrap();
        assert_eq!(format_date(date, &ist()), "18 Oct 2026, 10:00 am");
    }

    #[test]
    fn compact_inr() {
        assert_eq!(format_inr_compact(Decimal::new(12_300_000, 0)), "₹1.2Cr");
        assert_eq!(format_inr_compact(Decimal::new(4_500_000, 0)), "₹45.0L");
        assert_eq!(format_inr_compact(Decimal::new(12_500, 0)), "₹12.5K");
        assert_eq!(format_inr_compact(Decimal::new(950, 0)), "₹950");
    }

    #[test]
    fn whatsapp_link_keeps_only_digits() {
        let link = whatsapp_link("+91 98765-43210", "Asha");
        assert!(link.starts_with("https://wa.me/919876543210?text=Hi%20Asha%2C%20I'm%20following%20up"));
        assert!(link.ends_with("good%20time%20to%20chat%3F"));
    }
}
