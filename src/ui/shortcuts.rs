/// Console command manager
pub struct ShortcutManager {
    shortcuts: Vec<Shortcut>,
}

#[derive(Clone)]
pub struct Shortcut {
    pub keys: Vec<&'static str>,
    pub args: &'static str,
    pub action: ShortcutAction,
    pub description: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShortcutAction {
    TogglePlay,
    Play,
    Pause,
    Stop,
    Replay,
    Status,
    Show,
    Edit,
    SetField,
    SetAmount,
    ApplyPreset,
    SetDuration,
    ShowDraft,
    ResetDraft,
    ApplyEdit,
    CancelEdit,
    Help,
    Quit,
}

impl ShortcutAction {
    /// Whether the action only makes sense with an editor open
    pub fn needs_editor(&self) -> bool {
        matches!(
            self,
            ShortcutAction::SetField
                | ShortcutAction::SetAmount
                | ShortcutAction::ApplyPreset
                | ShortcutAction::SetDuration
                | ShortcutAction::ShowDraft
                | ShortcutAction::ResetDraft
                | ShortcutAction::ApplyEdit
                | ShortcutAction::CancelEdit
        )
    }
}

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: ShortcutAction,
    pub args: String,
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManager {
    pub fn new() -> Self {
        let mut manager = Self {
            shortcuts: Vec::new(),
        };
        manager.register_defaults();
        manager
    }

    fn register_defaults(&mut self) {
        // Playback controls
        self.add(&[""], "", ShortcutAction::TogglePlay, "Play/Pause (empty line)");
        self.add(&["play", "p"], "", ShortcutAction::Play, "Play");
        self.add(&["pause"], "", ShortcutAction::Pause, "Pause");
        self.add(&["stop", "s"], "", ShortcutAction::Stop, "Stop and jump to the receipt");
        self.add(&["replay", "r"], "", ShortcutAction::Replay, "Replay with a new deal");
        self.add(&["status", "st"], "", ShortcutAction::Status, "Show step progress");
        self.add(&["show"], "", ShortcutAction::Show, "Show the current step");

        // Deal editor
        self.add(&["edit", "e"], "", ShortcutAction::Edit, "Open the deal editor");
        self.add(&["set"], "<field> <value>", ShortcutAction::SetField, "Set a text field");
        self.add(&["amount"], "<amount>", ShortcutAction::SetAmount, "Set the deal amount");
        self.add(&["preset"], "<1-4|name>", ShortcutAction::ApplyPreset, "Apply a preset deal");
        self.add(&["duration"], "<ms>", ShortcutAction::SetDuration, "Set the step duration");
        self.add(&["draft"], "", ShortcutAction::ShowDraft, "Show the draft");
        self.add(&["reset"], "", ShortcutAction::ResetDraft, "Discard draft changes");
        self.add(&["apply"], "", ShortcutAction::ApplyEdit, "Apply changes and close the editor");
        self.add(&["cancel"], "", ShortcutAction::CancelEdit, "Close the editor without applying");

        // Application
        self.add(&["help", "h", "?"], "", ShortcutAction::Help, "Show commands");
        self.add(&["quit", "q", "exit"], "", ShortcutAction::Quit, "Quit");
    }

    fn add(
        &mut self,
        keys: &[&'static str],
        args: &'static str,
        action: ShortcutAction,
        description: &str,
    ) {
        self.register(Shortcut {
            keys: keys.to_vec(),
            args,
            action,
            description: description.to_string(),
        });
    }

    pub fn register(&mut self, shortcut: Shortcut) {
        self.shortcuts.push(shortcut);
    }

    #[cfg(test)]
    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Match a console line against the registered commands
    pub fn parse(&self, line: &str) -> Option<Invocation> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let word = word.to_ascii_lowercase();

        self.shortcuts
            .iter()
            .find(|s| s.keys.iter().any(|k| *k == word))
            .map(|s| Invocation {
                action: s.action,
                args: rest.to_string(),
            })
    }

    /// One line per command
    pub fn help_text(&self) -> String {
        self.shortcuts
            .iter()
            .map(|s| {
                let keys = match s.keys.as_slice() {
                    [""] => "<enter>".to_string(),
                    keys => keys.join(", "),
                };
                let usage = if s.args.is_empty() {
                    keys
                } else {
                    format!("{} {}", keys, s.args)
                };
                format!("  {:<28} {}", usage, s.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_playback_commands() {
        let manager = ShortcutManager::new();
        assert_eq!(manager.parse("play").unwrap().action, ShortcutAction::Play);
        assert_eq!(manager.parse("  R ").unwrap().action, ShortcutAction::Replay);
        assert_eq!(manager.parse("").unwrap().action, ShortcutAction::TogglePlay);
        assert!(manager.parse("rewind").is_none());
    }

    #[test]
    fn test_parse_keeps_arguments() {
        let manager = ShortcutManager::new();
        let inv = manager.parse("set jurisdiction  Delaware, USA").unwrap();
        assert_eq!(inv.action, ShortcutAction::SetField);
        assert_eq!(inv.args, "jurisdiction  Delaware, USA");

        let inv = manager.parse("amount $1,000,000").unwrap();
        assert_eq!(inv.action, ShortcutAction::SetAmount);
        assert_eq!(inv.args, "$1,000,000");
    }

    #[test]
    fn test_editor_actions() {
        assert!(ShortcutAction::ApplyEdit.needs_editor());
        assert!(!ShortcutAction::Edit.needs_editor());
        assert!(!ShortcutAction::Replay.needs_editor());
    }

    #[test]
    fn test_help_lists_every_command() {
        let manager = ShortcutManager::new();
        let help = manager.help_text();
        assert_eq!(help.lines().count(), manager.shortcuts().len());
        assert!(help.contains("<enter>"));
        assert!(help.contains("preset <1-4|name>"));
    }
}
