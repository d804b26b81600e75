//! Process-wide style registration.
//!
//! The built-in keyframes are registered once at startup. Later calls hand
//! back the same sheet and do nothing else.

use std::sync::OnceLock;

use crate::logging::{log, obj, v_str, Domain, Level};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    pub name: &'static str,
    pub css: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    blocks: Vec<StyleBlock>,
}

/// Loading-skeleton sweep.
const SHIMMER: StyleBlock = StyleBlock {
    name: "shimmer",
    css: "@keyframes shimmer {\n  100% {\n    transform: translateX(100%);\n  }\n}\n",
};

static GLOBAL: OnceLock<StyleSheet> = OnceLock::new();

impl StyleSheet {
    pub fn builtin() -> Self {
        Self { blocks: vec![SHIMMER] }
    }

    pub fn blocks(&self) -> &[StyleBlock] {
        &self.blocks
    }

    pub fn get(&self, name: &str) -> Option<&StyleBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    pub fn css(&self) -> String {
        self.blocks.iter().map(|b| b.css).collect::<Vec<_>>().join("\n")
    }
}

/// Register the built-in styles. Idempotent.
pub fn install_global_styles() -> &'static StyleSheet {
    GLOBAL.get_or_init(|| {
        let sheet = StyleSheet::builtin();
        let names: Vec<_> = sheet.blocks().iter().map(|b| v_str(b.name)).collect();
        log(
            Level::Info,
            Domain::Style,
            "installed",
            obj(&[("blocks", serde_json::Value::Array(names))]),
        );
        sheet
    })
}

pub fn is_installed() -> bool {
    GLOBAL.get().is_some()
}
