//! Message rendering
//!
//! Output uses `*bold*` and `_italic_` markers; channel specific escaping
//! happens in the sink.

use crate::report::{Section, TokenReport};
use crate::window::WindowDeltas;
use chrono::Duration;
use numfmt::{Formatter, Precision, Scales};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Render a full report
pub fn render_report(report: &TokenReport) -> String {
    [
        margin_block(report),
        spot_block(report),
        futures_block(report),
        format!("Last signal: {}", last_signal(report.since_last_signal)),
    ]
    .join("\n\n")
}

/// Render the notice for an asset that just appeared in margin statistics
pub fn render_new_listing(symbol: &str) -> String {
    format!("#*{}* 🆕\n\n#new", symbol)
}

fn margin_block(report: &TokenReport) -> String {
    let symbol = &report.symbol;
    let margin = &report.margin;

    let ratio = margin
        .borrow_repay_ratio
        .map(format_number)
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "#*{symbol}*\n\n\
         {} Borrowed *{}* ({} {symbol}) {}%\n\
         {} Repaid *{}* ({} {symbol}) {}%\n\n\
         ⚖️ B/R ratio *{ratio}*\n\
         🏦 Available *{}* {symbol}",
        trend_emoji(margin.borrow_change_pct),
        format_dollars(margin.total_borrow_usdt),
        format_scaled(margin.total_borrow),
        format_change(margin.borrow_change_pct),
        trend_emoji(margin.repay_change_pct),
        format_dollars(margin.total_repay_usdt),
        format_scaled(margin.total_repay),
        format_change(margin.repay_change_pct),
        format_scaled(margin.available),
    )
}

fn spot_block(report: &TokenReport) -> String {
    let daily = match &report.daily_volume {
        Section::Available(daily) => format!(
            "💰 24h volume: *{}* ({} {})",
            format_dollars(daily.quote_volume),
            format_scaled(daily.volume),
            report.symbol
        ),
        _ => "💰 24h volume: no data".to_string(),
    };

    let volume = match &report.volume {
        Section::Available(volume) => format!(
            "🟢 Buy: {}\n🔴 Sell: {}\n⚖️ Buy/sell ratios: {}",
            window_line(&volume.buy, "%"),
            window_line(&volume.sell, "%"),
            ratio_line(&volume.buy_sell_ratios)
        ),
        _ => "📊 Trading volumes: no data".to_string(),
    };

    format!("💸 *Spot*\n\n{daily}\n{volume}")
}

fn futures_block(report: &TokenReport) -> String {
    if matches!(report.funding, Section::NotListed) {
        return "💸 *Futures* not listed".to_string();
    }

    let funding = match (&report.funding, report.time_to_funding()) {
        (Section::Available(funding), Some(until)) => format!(
            "⏳ Funding rate *{}*% in *{}*",
            format_rate(funding.rate),
            format_duration(until)
        ),
        _ => "⏳ Funding rate: no data".to_string(),
    };

    let open_interest = match &report.open_interest {
        Section::Available(deltas) => format!("💣 OI: {}", window_line(deltas, "%")),
        _ => "💣 OI: no data".to_string(),
    };

    let long_short = match &report.long_short {
        Section::Available(ratio) => format!(
            "⚖️ Long/short ratio *{}*: {}",
            format_number(ratio.current),
            window_line(&ratio.deltas, "")
        ),
        _ => "⚖️ Long/short ratio: no data".to_string(),
    };

    format!("💸 *Futures*\n\n{funding}\n{open_interest}\n{long_short}")
}

fn window_line(deltas: &WindowDeltas, unit: &str) -> String {
    if deltas.is_empty() {
        return "no data".to_string();
    }

    deltas
        .iter()
        .map(|(window, delta)| format!("• _{}_ *{}*{}", window, format_change(*delta), unit))
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio_line(ratios: &WindowDeltas) -> String {
    if ratios.is_empty() {
        return "no data".to_string();
    }

    ratios
        .iter()
        .map(|(window, ratio)| format!("• _{}_ *{}*", window, format_number(*ratio)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn last_signal(since: Option<Duration>) -> String {
    match since {
        Some(since) => format!("{} ago", format_duration(since)),
        None => "never".to_string(),
    }
}

fn trend_emoji(change: Decimal) -> &'static str {
    if change > Decimal::ZERO {
        "🔺"
    } else if change < Decimal::ZERO {
        "🔻"
    } else {
        "➖"
    }
}

fn number_formatter() -> Formatter {
    Formatter::new()
        .precision(Precision::Decimals(2))
        .separator(',')
        .unwrap_or_default()
}

fn scaled_formatter() -> Formatter {
    number_formatter().scales(Scales::short())
}

fn dollar_formatter() -> Formatter {
    scaled_formatter().prefix("$").unwrap_or_default()
}

/// Truncate to two decimals, then hand the value to `formatter`
///
/// Whole numbers drop the `.0` and scale units are glued to the number
/// ("1.5M", not "1.5 M").
fn render_with(formatter: &mut Formatter, value: Decimal) -> String {
    let value = value.trunc_with_scale(2);
    let value = if value.is_zero() {
        0.0
    } else {
        value.to_f64().unwrap_or_default()
    };

    let text = formatter.fmt2(value).replace(' ', "");
    match text.find(".0") {
        Some(at) if !text[at + 2..].starts_with(|c: char| c.is_ascii_digit()) => {
            format!("{}{}", &text[..at], &text[at + 2..])
        }
        _ => text,
    }
}

/// Number truncated to two decimals with thousands separators
pub fn format_number(value: Decimal) -> String {
    render_with(&mut number_formatter(), value)
}

/// Number with a K/M/B/T suffix
pub fn format_scaled(value: Decimal) -> String {
    render_with(&mut scaled_formatter(), value)
}

pub fn format_dollars(value: Decimal) -> String {
    render_with(&mut dollar_formatter(), value)
}

/// Signed number, positive values get a leading `+`
pub fn format_change(value: Decimal) -> String {
    let text = format_number(value);
    if value.trunc_with_scale(2) > Decimal::ZERO {
        format!("+{text}")
    } else {
        text
    }
}

/// Funding rate fraction as percent
fn format_rate(rate: Decimal) -> String {
    (rate * Decimal::ONE_HUNDRED)
        .trunc_with_scale(4)
        .normalize()
        .to_string()
}

/// Countdown like "1d 2h 5min"
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes < 1 {
        return "<1min".to_string();
    }

    let (days, hours, minutes) = (minutes / 1440, minutes / 60 % 24, minutes % 60);
    let parts = [(days, "d"), (hours, "h"), (minutes, "min")];

    parts
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{amount}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}
