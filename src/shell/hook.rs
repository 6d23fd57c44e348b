// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported shell: {0} (supported: bash, zsh, fish)")]
pub struct UnsupportedShell(pub String);

impl FromStr for Shell {
    type Err = UnsupportedShell;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shell| shell.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedShell(s.to_owned()))
    }
}

const BASH_HOOK: &str = r#"_enva_hook() { local s=$?; eval "$(enva export)"; return $s; }
if ! [[ "${PROMPT_COMMAND:-}" =~ _enva_hook ]]; then PROMPT_COMMAND="_enva_hook${PROMPT_COMMAND:+;$PROMPT_COMMAND}"; fi
"#;

const ZSH_HOOK: &str = r#"_enva_hook() { eval "$(enva export)"; }; autoload -Uz add-zsh-hook; add-zsh-hook precmd _enva_hook
"#;

const FISH_HOOK: &str = r#"function _enva_hook --on-variable PWD
    enva export | source
end
enva export | source
"#;

/// Snippet that re-runs `enva export` whenever the prompt is drawn (or `PWD` changes in fish).
pub fn hook_script(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash => BASH_HOOK,
        Shell::Zsh => ZSH_HOOK,
        Shell::Fish => FISH_HOOK,
    }
}
