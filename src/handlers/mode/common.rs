//! Helpers shared by channel and user mode handling.

use tinyircd_proto::ModeDirection;

/// Channel names start with `#` or `&`.
pub fn is_channel_target(target: &str) -> bool {
    target.starts_with(['#', '&'])
}

/// Accumulates applied changes into a compact `+ab-c` string plus parameters.
#[derive(Debug, Default)]
pub struct ModeLine {
    letters: String,
    params: Vec<String>,
    current: Option<ModeDirection>,
}

impl ModeLine {
    pub fn push(&mut self, direction: ModeDirection, letter: char, param: Option<String>) {
        if self.current != Some(direction) {
            self.letters.push(direction.sign());
            self.current = Some(direction);
        }
        self.letters.push(letter);
        self.params.extend(param);
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Letters only, e.g. `+i-w`.
    pub fn letters(&self) -> &str {
        &self.letters
    }

    /// Letters followed by space-separated parameters.
    pub fn render(&self) -> String {
        let mut out = self.letters.clone();
        for param in &self.params {
            out.push(' ');
            out.push_str(param);
        }
        out
    }
}
