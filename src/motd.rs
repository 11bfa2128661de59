//! MOTD markup expansion.
//!
//! Operators write the MOTD file with `$` markup which is turned into mIRC
//! control codes once, when the configuration is loaded:
//!
//! | Markup | Result |
//! |---|---|
//! | `$$` | a literal `$` |
//! | `$b text $r` | bold |
//! | `$i text $r` | italic |
//! | `$u text $r` | underline |
//! | `$c[red,black] text $c` | named foreground/background colour, then reset |
//! | `$c4` or `$c4,1` | numeric colour code |
//! | `$r` | reset |

use regex::{Captures, Regex};

const BOLD: &str = "\x02";
const ITALIC: &str = "\x1D";
const UNDERLINE: &str = "\x1F";
const COLOR: &str = "\x03";
const RESET: &str = "\x0F";

/// Stand-in for `$$` while the other rules run.
const ESCAPED_DOLLAR: &str = "\u{E000}";

const COLOR_NAMES: &[(&str, &str)] = &[
    ("white", "00"),
    ("black", "01"),
    ("blue", "02"),
    ("green", "03"),
    ("red", "04"),
    ("brown", "05"),
    ("purple", "06"),
    ("orange", "07"),
    ("yellow", "08"),
    ("light green", "09"),
    ("cyan", "10"),
    ("light cyan", "11"),
    ("light blue", "12"),
    ("pink", "13"),
    ("grey", "14"),
    ("light grey", "15"),
];

fn color_code(name: &str) -> Option<&'static str> {
    let name = name.trim();
    COLOR_NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

fn pad_color(code: &str) -> String {
    match code.parse::<u32>() {
        Ok(n) => format!("{n:02}"),
        Err(_) => code.to_string(),
    }
}

/// Expand MOTD markup into control codes.
pub fn expand(text: &str) -> String {
    let mut text = text.replace("$$", ESCAPED_DOLLAR);

    for (pattern, code) in [
        (r"\$b([^$]*)\$r", BOLD),
        (r"\$i([^$]*)\$r", ITALIC),
        (r"\$u([^$]*)\$r", UNDERLINE),
    ] {
        if let Ok(re) = Regex::new(pattern) {
            text = re
                .replace_all(&text, format!("{code}${{1}}{RESET}").as_str())
                .into_owned();
        }
    }

    if let Ok(re) = Regex::new(r"\$c\[([^\]]+)\]([^$]*)\$c") {
        text = re
            .replace_all(&text, |caps: &Captures<'_>| {
                let mut colors = caps[1].split(',');
                let mut out = String::new();
                if let Some(fg) = colors.next().and_then(color_code) {
                    out.push_str(COLOR);
                    out.push_str(fg);
                    if let Some(bg) = colors.next().and_then(color_code) {
                        out.push(',');
                        out.push_str(bg);
                    }
                }
                out.push_str(&caps[2]);
                out.push_str(RESET);
                out
            })
            .into_owned();
    }

    if let Ok(re) = Regex::new(r"\$c(\d+)(?:,(\d+))?") {
        text = re
            .replace_all(&text, |caps: &Captures<'_>| {
                let mut out = format!("{COLOR}{}", pad_color(&caps[1]));
                if let Some(bg) = caps.get(2) {
                    out.push(',');
                    out.push_str(&pad_color(bg.as_str()));
                }
                out
            })
            .into_owned();
    }

    text.replace("$r", RESET).replace(ESCAPED_DOLLAR, "$")
}
