//! Interaction scripts
//!
//! One command per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! click trigger          activate the select trigger
//! click option <value>   activate the option row carrying <value>
//! click outside          activate nothing in particular
//! click <x> <y>          activate whatever is at a point
//! write <value>          set the form value from the model side
//! disable | enable       toggle the form control's disabled state
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// One scripted user or model action
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    ClickTrigger,
    ClickOption(String),
    ClickOutside,
    ClickAt { x: f32, y: f32 },
    Write(String),
    Disable,
    Enable,
}

impl FromStr for Interaction {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "click" => parse_click(rest),
            "write" => Ok(Interaction::Write(rest.to_string())),
            "disable" if rest.is_empty() => Ok(Interaction::Disable),
            "enable" if rest.is_empty() => Ok(Interaction::Enable),
            "disable" | "enable" => Err(format!("`{command}` takes no arguments")),
            other => Err(format!("unknown command `{other}`")),
        }
    }
}

fn parse_click(rest: &str) -> std::result::Result<Interaction, String> {
    match rest.split_once(char::is_whitespace) {
        Some(("option", value)) => Ok(Interaction::ClickOption(value.trim().to_string())),
        Some((x, y)) => {
            let x: f32 = x.parse().map_err(|_| format!("bad x coordinate `{x}`"))?;
            let y = y.trim();
            let y: f32 = y.parse().map_err(|_| format!("bad y coordinate `{y}`"))?;
            Ok(Interaction::ClickAt { x, y })
        }
        None => match rest {
            "trigger" => Ok(Interaction::ClickTrigger),
            "outside" => Ok(Interaction::ClickOutside),
            "option" => Err("`click option` needs a value".to_string()),
            "" => Err("`click` needs a target".to_string()),
            other => Err(format!("unknown click target `{other}`")),
        },
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interaction::ClickTrigger => write!(f, "click trigger"),
            Interaction::ClickOption(value) => write!(f, "click option {value}"),
            Interaction::ClickOutside => write!(f, "click outside"),
            Interaction::ClickAt { x, y } => write!(f, "click {x} {y}"),
            Interaction::Write(value) => write!(f, "write {value}"),
            Interaction::Disable => write!(f, "disable"),
            Interaction::Enable => write!(f, "enable"),
        }
    }
}

/// A parsed script step with its 1-based line number
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub line: usize,
    pub interaction: Interaction,
}

/// Parse a whole script, stopping at the first bad line
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    text.lines()
        .enumerate()
        .map(|(index, raw)| (index + 1, raw.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, content)| {
            content
                .parse()
                .map(|interaction| Step { line, interaction })
                .map_err(|message| AppError::Script { line, message })
        })
        .collect()
}
