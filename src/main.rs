mod core;
mod playback;
mod scenario;
mod ui;

use anyhow::{Context, Result};
use playback::{PlaybackConfig, PlaybackEngine, PlaybackHandle};
use scenario::{EditableField, ScenarioEditor, ScenarioGenerator, ScenarioStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use ui::{Invocation, ShortcutAction, ShortcutManager, TextPresenter};

/// Persisted user preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct AppSettings {
    step_duration_ms: u64,
    autoplay: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            step_duration_ms: PlaybackConfig::DEFAULT_STEP_DURATION_MS,
            autoplay: false,
        }
    }
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dealroom").join("settings.json"))
    }

    fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(contents) = fs::read_to_string(&path) {
                    if let Ok(settings) = serde_json::from_str(&contents) {
                        return settings;
                    }
                }
                warn!("ignoring unreadable settings at {}", path.display());
            }
        }
        Self::default()
    }

    fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                if let Err(e) = fs::write(&path, json) {
                    warn!("failed to save settings: {}", e);
                }
            }
        }
    }

    fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig::default().with_step_duration(Duration::from_millis(self.step_duration_ms))
    }
}

/// Console state outside the playback engine
struct App {
    handle: PlaybackHandle,
    store: ScenarioStore,
    generator: ScenarioGenerator,
    shortcuts: ShortcutManager,
    settings: AppSettings,
    editor: Option<ScenarioEditor>,
}

impl App {
    /// Returns false once the user asks to quit
    async fn handle_line(&mut self, line: &str) -> Result<bool> {
        let Some(Invocation { action, args }) = self.shortcuts.parse(line) else {
            println!("unknown command, type 'help' for a list");
            return Ok(true);
        };

        if action.needs_editor() && self.editor.is_none() {
            println!("no edit in progress, type 'edit' first");
            return Ok(true);
        }

        match action {
            ShortcutAction::TogglePlay => {
                if self.handle.state().is_playing() {
                    self.handle.pause().await?;
                } else {
                    self.handle.play().await?;
                }
            }
            ShortcutAction::Play => {
                self.handle.play().await?;
            }
            ShortcutAction::Pause => {
                self.handle.pause().await?;
            }
            ShortcutAction::Stop => {
                self.handle.stop().await?;
            }
            ShortcutAction::Replay => {
                self.handle.replay().await?;
            }
            ShortcutAction::Status => {
                println!("{}", ui::render::status_line(&self.handle.snapshot()));
            }
            ShortcutAction::Show => {
                let step = self.handle.state().step();
                print!("{}", ui::render::render_view(step, &self.store.current()));
            }
            ShortcutAction::Edit => {
                if self.editor.is_none() {
                    let step_duration = self.handle.snapshot().config.step_duration;
                    self.editor = Some(ScenarioEditor::new(&self.store.current(), step_duration));
                }
                self.print_draft();
            }
            ShortcutAction::SetField => self.set_field(&args),
            ShortcutAction::SetAmount => {
                if let Some(editor) = self.editor.as_mut() {
                    let deal = editor.set_deal_amount(&args);
                    println!("deal amount {}, total {}", deal, editor.draft().total_amount);
                }
            }
            ShortcutAction::ApplyPreset => {
                if let Some(editor) = self.editor.as_mut() {
                    match editor.apply_preset(&args) {
                        Ok(()) => println!("{}", ui::render::header(editor.draft())),
                        Err(e) => println!("{}", e),
                    }
                }
            }
            ShortcutAction::SetDuration => match args.parse::<u64>() {
                Ok(ms) => {
                    if let Some(editor) = self.editor.as_mut() {
                        editor.set_step_duration_ms(ms);
                        println!("step duration {} ms", editor.step_duration().as_millis());
                    }
                }
                Err(_) => println!("duration must be a whole number of milliseconds"),
            },
            ShortcutAction::ShowDraft => self.print_draft(),
            ShortcutAction::ResetDraft => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.reset();
                }
                self.print_draft();
            }
            ShortcutAction::ApplyEdit => self.commit_edit().await?,
            ShortcutAction::CancelEdit => {
                self.editor = None;
                println!("edit discarded");
            }
            ShortcutAction::Help => println!("{}", self.shortcuts.help_text()),
            ShortcutAction::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn set_field(&mut self, args: &str) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let (name, value) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
        match name.parse::<EditableField>() {
            Ok(field) => {
                editor.set_field(field, value.trim());
                println!("{} = {}", field.label(), value.trim());
            }
            Err(e) => {
                let known: Vec<_> = EditableField::ALL.iter().map(|f| f.label()).collect();
                println!("{} (fields: {})", e, known.join(", "));
            }
        }
    }

    fn print_draft(&self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let draft = editor.draft();
        println!("{}", ui::render::header(draft));
        for step in core::STEPS.iter() {
            println!("{}", ui::render::step_view(step.kind, draft));
        }
        println!("step duration {} ms", editor.step_duration().as_millis());
    }

    async fn commit_edit(&mut self) -> Result<()> {
        let Some(editor) = self.editor.take() else {
            return Ok(());
        };
        let outcome = editor.commit(&self.store, &mut self.generator);
        self.handle.set_step_duration(outcome.step_duration).await?;

        self.settings.step_duration_ms = outcome.step_duration.as_millis() as u64;
        self.settings.save();
        println!("applied transaction #{}", outcome.record.transaction_id);
        Ok(())
    }
}

async fn run() -> Result<()> {
    let settings = AppSettings::load();
    debug!(?settings, "loaded settings");

    let mut generator = ScenarioGenerator::new();
    let store = ScenarioStore::new(generator.seed_scenario());
    let (handle, engine) = PlaybackEngine::spawn(
        settings.playback_config(),
        store.clone(),
        ScenarioGenerator::new(),
    );

    let presenter = tokio::spawn(ui::render::drive(
        TextPresenter::stdout(),
        handle.subscribe(),
        store.subscribe(),
    ));

    if settings.autoplay {
        handle.play().await?;
    }

    let mut app = App {
        handle: handle.clone(),
        store,
        generator,
        shortcuts: ShortcutManager::new(),
        settings,
        editor: None,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read console input")? {
        if !app.handle_line(&line).await? {
            break;
        }
    }

    info!("shutting down");
    handle.shutdown().await;
    engine.await.context("playback engine panicked")?;
    presenter.abort();
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so they do not interleave with the views on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    rt.block_on(run())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_wait_for_play() {
        let settings = AppSettings::default();
        assert!(!settings.autoplay);
        assert_eq!(settings.playback_config(), PlaybackConfig::default());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"step_duration_ms": 4500}"#).unwrap();
        assert!(!settings.autoplay);
        assert_eq!(
            settings.playback_config().step_duration,
            Duration::from_millis(4500)
        );

        let clamped = AppSettings {
            step_duration_ms: 50,
            autoplay: true,
        };
        assert_eq!(
            clamped.playback_config().step_duration,
            Duration::from_millis(PlaybackConfig::MIN_STEP_DURATION_MS)
        );
    }
}
