//! Plain-text presentation of the walkthrough.
//!
//! The presenter is re-invoked whenever the active step or the scenario
//! changes; progress within a step is only shown on request via
//! [`status_line`].

use crate::core::{ScenarioRecord, StepDescriptor, StepKind, STEPS};
use crate::playback::{PlaybackSnapshot, PlaybackState};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::warn;

/// Width of the progress bar in characters
const PROGRESS_BAR_WIDTH: usize = 20;

/// Receives the step to show and the data to show in it
pub trait Presenter: Send {
    fn render(&mut self, step: &StepDescriptor, scenario: &ScenarioRecord);
}

/// Writes each view to a text sink
pub struct TextPresenter<W: Write + Send> {
    out: W,
}

impl TextPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Presenter for TextPresenter<W> {
    fn render(&mut self, step: &StepDescriptor, scenario: &ScenarioRecord) {
        let view = render_view(step, scenario);
        if let Err(e) = self.out.write_all(view.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("failed to write view: {}", e);
        }
    }
}

/// `SS:CC` seconds and centiseconds
pub fn format_timer(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    format!("{:02}:{:02}", ms / 1000, (ms % 1000) / 10)
}

/// Share of the step already played, 0..=100
pub fn progress_percent(elapsed: Duration, step_duration: Duration) -> u32 {
    if step_duration.is_zero() {
        return 100;
    }
    let pct = (elapsed.as_secs_f64() / step_duration.as_secs_f64() * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

/// Step indicator row; steps up to and including the active one are marked
pub fn step_strip(step_index: usize) -> String {
    STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let mark = if i <= step_index { 'x' } else { ' ' };
            format!("[{}] {}", mark, step.label)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Controls currently on offer
pub fn control_hints(playback: PlaybackState) -> &'static str {
    match playback {
        PlaybackState::Playing => "pause | stop | replay",
        PlaybackState::Paused | PlaybackState::Stopped => "play | stop | replay",
    }
}

/// Timer, progress bar and available controls
pub fn status_line(snapshot: &PlaybackSnapshot) -> String {
    let state = &snapshot.state;
    let pct = progress_percent(state.elapsed, snapshot.config.step_duration);
    let filled = pct as usize * PROGRESS_BAR_WIDTH / 100;

    format!(
        "{} [{}{}] {:>3}%  step {}/{} {} ({:?})  controls: {}",
        format_timer(state.elapsed),
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        pct,
        state.step_index + 1,
        STEPS.len(),
        state.step().label,
        state.playback,
        control_hints(state.playback),
    )
}

pub fn header(scenario: &ScenarioRecord) -> String {
    format!(
        "Scapcher Deal Room | Transaction #{} | {} Deal",
        scenario.transaction_id, scenario.deal_amount
    )
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {:<18} {}", label, value);
}

/// Body of a single step
pub fn step_view(kind: StepKind, scenario: &ScenarioRecord) -> String {
    let mut out = String::new();
    match kind {
        StepKind::Contract => {
            let _ = writeln!(out, "Legal Agreement ({})", scenario.statuses.contract);
            line(&mut out, "Agreement Type", &scenario.agreement_type);
            line(&mut out, "Effective Date", &scenario.effective_date);
            line(&mut out, "Jurisdiction", &scenario.jurisdiction);
            line(&mut out, "Buyer", &scenario.buyer);
            line(&mut out, "Seller", &scenario.seller);
            line(&mut out, "Company", &scenario.company);
            line(&mut out, "Asset", &scenario.asset);
            line(&mut out, "Asset Type", &scenario.asset_type);
            line(&mut out, "Delivery Medium", &scenario.delivery_medium);
            line(&mut out, "Deal Amount", &scenario.deal_amount);
        }
        StepKind::Payment => {
            let _ = writeln!(
                out,
                "Payment {} (#{})",
                scenario.statuses.payment, scenario.transaction_id
            );
            line(&mut out, "Deal Amount", &scenario.deal_amount);
            line(&mut out, "Platform Fee (10%)", &scenario.platform_fee);
            line(&mut out, "Disbursement (1%)", &scenario.disbursement_fee);
            line(&mut out, "Total Amount", &scenario.total_amount);
            line(&mut out, "Payment Date", &scenario.payment_date);
        }
        StepKind::Transfer => {
            let _ = writeln!(out, "Business Transfer ({})", scenario.statuses.transfer);
            line(&mut out, "Buyer", &scenario.buyer);
            line(&mut out, "Seller", &scenario.seller);
            line(&mut out, "Company", &scenario.company);
            line(&mut out, "Asset", &scenario.asset);
            line(&mut out, "Asset Type", &scenario.asset_type);
            line(&mut out, "Delivery Medium", &scenario.delivery_medium);
            line(&mut out, "Transfer Date", &scenario.transfer_date);
        }
        StepKind::Receipt => {
            let _ = writeln!(
                out,
                "Deal Completed Successfully, Receipt #{} ({})",
                scenario.transaction_id, scenario.statuses.receipt
            );
            line(&mut out, "Buyer", &scenario.buyer);
            line(&mut out, "Seller", &scenario.seller);
            line(&mut out, "Company", &scenario.company);
            line(&mut out, "Asset", &scenario.asset);
            line(&mut out, "Deal Value", &scenario.deal_amount);
            line(&mut out, "Platform Fee", &scenario.platform_fee);
            line(&mut out, "Disbursement Fee", &scenario.disbursement_fee);
            line(&mut out, "Total Amount", &scenario.total_amount);
            line(&mut out, "Completed On", &scenario.completion_date);
            line(&mut out, "Receipt ID", &scenario.receipt_id.to_string());
        }
    }
    out
}

/// Header, step strip and step body
pub fn render_view(step: &StepDescriptor, scenario: &ScenarioRecord) -> String {
    let index = STEPS.iter().position(|s| s.kind == step.kind).unwrap_or(0);
    format!(
        "\n{}\n{}\n\n{}",
        header(scenario),
        step_strip(index),
        step_view(step.kind, scenario)
    )
}

/// Re-render whenever the active step or the scenario changes.
///
/// Returns once either source is closed.
pub async fn drive<P: Presenter>(
    mut presenter: P,
    mut playback: watch::Receiver<PlaybackSnapshot>,
    mut scenario: watch::Receiver<Arc<ScenarioRecord>>,
) {
    let mut shown_step = playback.borrow_and_update().state.step_index;
    let current = scenario.borrow_and_update().clone();
    let step = playback.borrow().state.step();
    presenter.render(step, &current);

    loop {
        tokio::select! {
            changed = playback.changed() => {
                if changed.is_err() {
                    break;
                }
                let step = playback.borrow_and_update().state.step();
                let index = playback.borrow().state.step_index;
                if index != shown_step {
                    shown_step = index;
                    let current = scenario.borrow().clone();
                    presenter.render(step, &current);
                }
            }
            changed = scenario.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = scenario.borrow_and_update().clone();
                let step = playback.borrow().state.step();
                presenter.render(step, &current);
            }
        }
    }
}
