//! Build variant selection.
//!
//! Two builds of the real implementation are published: a modern ES2020 module and
//! a broad-compatibility IIFE. The variant comes from the forced override if one is
//! set, otherwise from a user-agent capability probe.

use crate::config::EnvVars;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_URL_PREFIX: &str = "https://js.usertour.io/";

const ES2020_PATH: &str = "es2020/usertour.js";
const LEGACY_PATH: &str = "legacy/usertour.iife.js";

static LEGACY_ENGINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"MSIE |Trident/|Edge/\d").expect("valid legacy engine regex"));
static IOS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:iPhone|iPad|iPod).*? OS (\d+)(?:_(\d+))?").expect("valid ios regex")
});
static FIREFOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Firefox|FxiOS)/(\d+)").expect("valid firefox regex"));
static CHROMIUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Chrome|Chromium|CriOS|Edg|EdgA|EdgiOS)/(\d+)").expect("valid chromium regex")
});
static SAFARI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Version/(\d+)(?:\.(\d+))?.*Safari/").expect("valid safari regex")
});

/// Build variant of the real implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserTarget {
    Es2020,
    Legacy,
}

impl BrowserTarget {
    /// Interpret a forced-variant override. Only `es2020` selects the modern build.
    pub fn from_override(value: &str) -> Self {
        if value == "es2020" {
            BrowserTarget::Es2020
        } else {
            BrowserTarget::Legacy
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BrowserTarget::Es2020 => "es2020",
            BrowserTarget::Legacy => "legacy",
        }
    }
}

impl fmt::Display for BrowserTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn version(caps: &regex::Captures<'_>) -> (u32, u32) {
    let part = |i| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };
    (part(1), part(2))
}

/// Capability probe over a user-agent string.
pub fn detect_browser_target(user_agent: &str) -> BrowserTarget {
    if user_agent.trim().is_empty() || LEGACY_ENGINE_RE.is_match(user_agent) {
        return BrowserTarget::Legacy;
    }

    // Every iOS browser runs on the system WebKit.
    if let Some(caps) = IOS_RE.captures(user_agent) {
        return supported(version(&caps) >= (13, 4));
    }
    if let Some(caps) = FIREFOX_RE.captures(user_agent) {
        return supported(version(&caps).0 >= 74);
    }
    if let Some(caps) = CHROMIUM_RE.captures(user_agent) {
        return supported(version(&caps).0 >= 80);
    }
    if let Some(caps) = SAFARI_RE.captures(user_agent) {
        return supported(version(&caps) >= (13, 1));
    }
    BrowserTarget::Legacy
}

fn supported(es2020: bool) -> BrowserTarget {
    if es2020 {
        BrowserTarget::Es2020
    } else {
        BrowserTarget::Legacy
    }
}

/// Where to fetch the real implementation from, and how to mount it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptSource {
    pub target: BrowserTarget,
    pub url: String,
    /// Mounted as a module script (`type="module"`) rather than a classic script.
    pub module: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Pick the build variant and URL, honouring override variables. Empty overrides
/// count as unset.
pub fn resolve_script_source(env: &EnvVars, url_prefix: &str, user_agent: &str) -> ScriptSource {
    let target = non_empty(&env.browser_target)
        .map(BrowserTarget::from_override)
        .unwrap_or_else(|| detect_browser_target(user_agent));

    match target {
        BrowserTarget::Es2020 => ScriptSource {
            target,
            url: non_empty(&env.es2020_url)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}{}", url_prefix, ES2020_PATH)),
            module: true,
        },
        BrowserTarget::Legacy => ScriptSource {
            target,
            url: non_empty(&env.legacy_url)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}{}", url_prefix, LEGACY_PATH)),
            module: false,
        },
    }
}
