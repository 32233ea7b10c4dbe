//! Middleware arguments and graph names.
//!
//! Arguments of the form `key:=value` configure the node rather than the
//! program. Keys starting with `__` are special (`__name`, `__ns`, `__master`,
//! `__log`), anything else is a topic remapping `from:=to`.

use crate::error::NodeError;
use log::debug;
use std::collections::HashMap;

/// master used when neither the environment nor the arguments name one
pub const DEFAULT_MASTER_URI: &str = "tcp://localhost:6480";

/// environment variable consulted before the `__master:=` argument
pub const MASTER_URI_ENV: &str = "MASTER_URI";

const ASSIGN: &str = ":=";

/// everything the node needs to know before it connects.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOptions {
    /// base name of the node, without namespace
    pub name: String,
    /// namespace the node lives in, always absolute
    pub namespace: String,
    pub master_uri: String,
    /// resolved `from` → resolved `to`
    pub remappings: HashMap<String, String>,
    /// CA certificate (PEM) for `tls://` masters
    pub ca_cert: Option<String>,
}

impl NodeOptions {
    /// options for a node called `name` with nothing remapped.
    pub fn new(name: &str) -> NodeOptions {
        NodeOptions {
            name: name.to_string(),
            namespace: "/".to_string(),
            master_uri: DEFAULT_MASTER_URI.to_string(),
            remappings: HashMap::new(),
            ca_cert: None,
        }
    }

    /// builds the options from the middleware arguments found in `args`.
    ///
    /// `default_name` is used unless `__name:=` overrides it; with `anonymous`
    /// a random suffix is appended so several copies can run side by side.
    /// `master_env` is the value of [`MASTER_URI_ENV`], if set.
    pub fn from_args<I, S>(
        default_name: &str,
        anonymous: bool,
        master_env: Option<String>,
        args: I,
    ) -> Result<NodeOptions, NodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = NodeOptions::new(default_name);
        if let Some(master) = master_env {
            options.master_uri = master;
        }

        let mut raw_remaps: Vec<(String, String)> = vec![];
        for arg in args {
            let Some((key, value)) = split_assignment(arg.as_ref()) else {
                continue;
            };
            match key {
                "__name" => options.name = value.to_string(),
                "__ns" => options.namespace = normalize_namespace(value)?,
                "__master" => options.master_uri = value.to_string(),
                "__log" => debug!("ignoring log file argument: {}", value),
                k if k.starts_with("__") => {
                    return Err(NodeError::InvalidArgument(arg.as_ref().to_string()))
                }
                _ => raw_remaps.push((key.to_string(), value.to_string())),
            }
        }

        if options.name.is_empty() || options.name.contains('/') {
            return Err(NodeError::InvalidName(options.name));
        }
        if anonymous {
            options.name = format!("{}_{}", options.name, uuid::Uuid::new_v4().simple());
        }

        // remaps are resolved against the final node name and namespace
        for (from, to) in raw_remaps {
            let from = options.resolve_unmapped(&from)?;
            let to = options.resolve_unmapped(&to)?;
            debug!("remapping {} -> {}", from, to);
            options.remappings.insert(from, to);
        }
        Ok(options)
    }

    /// fully qualified name of the node, e.g. `/sub`.
    pub fn fully_qualified_name(&self) -> String {
        join(&self.namespace, &self.name)
    }

    /// resolves `name` to a global graph name and applies the remappings.
    /// ```
    /// use listener_node::args::NodeOptions;
    /// let options = NodeOptions::from_args("sub", false, None, ["__ns:=/robot", "pose:=/vicon/Jet/Jet"]).unwrap();
    /// assert_eq!(options.resolve("pose").unwrap(), "/vicon/Jet/Jet");
    /// assert_eq!(options.resolve("odom").unwrap(), "/robot/odom");
    /// assert_eq!(options.resolve("~status").unwrap(), "/robot/sub/status");
    /// ```
    pub fn resolve(&self, name: &str) -> Result<String, NodeError> {
        let resolved = self.resolve_unmapped(name)?;
        let resolved = match self.remappings.get(&resolved) {
            Some(to) => to.clone(),
            None => resolved,
        };
        if resolved == "/" {
            return Err(NodeError::InvalidName(name.to_string()));
        }
        Ok(resolved)
    }

    fn resolve_unmapped(&self, name: &str) -> Result<String, NodeError> {
        validate_name(name)?;
        let resolved = if name.starts_with('/') {
            name.to_string()
        } else if let Some(private) = name.strip_prefix('~') {
            join(&self.fully_qualified_name(), private)
        } else {
            join(&self.namespace, name)
        };
        Ok(trim_trailing_slash(resolved))
    }
}

/// splits `key:=value`, ignoring anything that is not an assignment.
fn split_assignment(arg: &str) -> Option<(&str, &str)> {
    let (key, value) = arg.split_once(ASSIGN)?;
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// true for arguments meant for the node rather than the command line parser.
pub fn is_node_argument(arg: &str) -> bool {
    split_assignment(arg).is_some()
}

/// checks a graph name: letters, digits, `_` and `/`, optionally led by `~`.
pub fn validate_name(name: &str) -> Result<(), NodeError> {
    let invalid = || NodeError::InvalidName(name.to_string());
    let mut chars = name.chars();
    let first = chars.next().ok_or_else(invalid)?;
    if !(first.is_ascii_alphabetic() || first == '/' || first == '~') {
        return Err(invalid());
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/') {
        return Err(invalid());
    }
    if name.contains("//") {
        return Err(invalid());
    }
    Ok(())
}

fn normalize_namespace(ns: &str) -> Result<String, NodeError> {
    validate_name(ns)?;
    if ns.starts_with('~') {
        return Err(NodeError::InvalidName(ns.to_string()));
    }
    let absolute = if ns.starts_with('/') {
        ns.to_string()
    } else {
        format!("/{}", ns)
    };
    Ok(trim_trailing_slash(absolute))
}

fn join(parent: &str, child: &str) -> String {
    let child = child.trim_start_matches('/');
    if parent.ends_with('/') {
        format!("{}{}", parent, child)
    } else {
        format!("{}/{}", parent, child)
    }
}

fn trim_trailing_slash(mut name: String) -> String {
    while name.len() > 1 && name.ends_with('/') {
        name.pop();
    }
    name
}
