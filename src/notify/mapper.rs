//! Source-address remapping for received notifications.

use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Maps the source address of a received notification before dispatch.
pub trait SourceMapper: Send + Sync {
    /// The address to report for a notification received from `remote`.
    fn map_address(&self, remote: &str) -> String;
}

/// The default mapper: every address passes through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityMapper;

impl SourceMapper for IdentityMapper {
    fn map_address(&self, remote: &str) -> String {
        remote.to_string()
    }
}

/// Substitutes one selected source address with addresses from a pool, in
/// deterministic round-robin order. Non-matching sources pass through.
///
/// Built from a mapping of the form `"<source>:<target>,<target>,..."`,
/// where a target of the form `10.0.0.1-5` expands to the address range
/// `10.0.0.1` through `10.0.0.5`. Primarily used to synthesize traffic from
/// many devices out of one sender during testing.
pub struct RoundRobinMapper {
    source: Option<String>,
    targets: Vec<String>,
    next: Mutex<usize>,
}

impl RoundRobinMapper {
    /// Parse a mapper from its configuration string.
    ///
    /// An unparseable mapping yields a passthrough mapper.
    pub fn new(mapping: &str) -> Self {
        info!(mapping, "apply trap source mapping");

        let mut source = None;
        let mut targets = Vec::new();
        if let Some((from, target_list)) = mapping.split_once(':') {
            targets = build_target_list(target_list);
            if !targets.is_empty() {
                source = Some(from.to_string());
            }
        }
        if source.is_none() {
            warn!(mapping, "no usable trap source mapping, passing through");
        }

        Self {
            source,
            targets,
            next: Mutex::new(0),
        }
    }
}

impl SourceMapper for RoundRobinMapper {
    fn map_address(&self, remote: &str) -> String {
        if self.source.as_deref() != Some(remote) {
            return remote.to_string();
        }
        let mut next = self.next.lock().expect("mapper index poisoned");
        let mapped = self.targets[*next % self.targets.len()].clone();
        *next = (*next + 1) % self.targets.len();
        mapped
    }
}

fn build_target_list(definition: &str) -> Vec<String> {
    debug!(definition, "build mapped address list");
    let mut targets = Vec::new();
    for token in definition.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if token.contains('-') {
            targets.extend(expand_range(token));
        } else {
            targets.push(token.to_string());
        }
    }
    targets
}

// Expand "a.b.c.start-end" into one address per final octet.
fn expand_range(description: &str) -> Vec<String> {
    let mut addresses = Vec::new();
    let tokens: Vec<&str> = description.split('.').collect();
    if tokens.len() != 4 {
        warn!(description, "ignoring invalid range description");
        return addresses;
    }
    let Some((start, end)) = tokens[3].split_once('-') else {
        warn!(description, "ignoring invalid range description");
        return addresses;
    };
    match (start.parse::<u32>(), end.parse::<u32>()) {
        (Ok(start), Ok(end)) => {
            for i in start..=end {
                addresses.push(format!("{}.{}.{}.{}", tokens[0], tokens[1], tokens[2], i));
            }
        }
        _ => warn!(description, "ignoring invalid range description"),
    }
    addresses
}
