use indicatif::ProgressStyle;
use tracing::{info_span, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TEMPLATE: &str = "[{elapsed_precise} / {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {span_fields}";

pub fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// A span that drives a progress bar while entered.
///
/// Bars are drawn by the `IndicatifLayer` installed by the binary. Without it
/// (library use, tests) the span is an ordinary span and nothing is drawn.
pub fn progress_span(len: u64, task: &str) -> Span {
    let span = info_span!("progress", task);
    span.pb_set_style(&progress_style());
    span.pb_set_length(len);

    span
}
