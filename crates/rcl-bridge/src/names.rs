// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node name, namespace and topic/service name rules.

/// Longest accepted node name.
pub const NODE_NAME_MAX_LENGTH: usize = 255;

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_valid_token(token: &str) -> bool {
    match token.chars().next() {
        Some(first) if !first.is_ascii_digit() => token.chars().all(is_token_char),
        _ => false,
    }
}

/// Validate a node name. Returns the reason on failure.
pub fn validate_node_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("node name must not be empty");
    }
    if name.len() > NODE_NAME_MAX_LENGTH {
        return Err("node name is too long");
    }
    if !name.chars().all(is_token_char) {
        return Err("node name must only contain alphanumerics and underscores");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("node name must not start with a number");
    }
    Ok(())
}

/// Normalize a namespace: empty means root.
#[must_use]
pub fn normalize_namespace(namespace: &str) -> String {
    if namespace.is_empty() {
        "/".to_string()
    } else {
        namespace.to_string()
    }
}

/// Validate an (already normalized) namespace.
pub fn validate_namespace(namespace: &str) -> Result<(), &'static str> {
    if namespace == "/" {
        return Ok(());
    }
    if !namespace.starts_with('/') {
        return Err("namespace must be absolute");
    }
    if namespace.ends_with('/') {
        return Err("namespace must not end with a slash");
    }
    if namespace[1..].split('/').all(is_valid_token) {
        Ok(())
    } else {
        Err("namespace contains an invalid token")
    }
}

/// Fully qualified node name.
#[must_use]
pub fn fully_qualified_name(namespace: &str, name: &str) -> String {
    if namespace == "/" {
        format!("/{name}")
    } else {
        format!("{namespace}/{name}")
    }
}

/// Expand a topic or service name against a node and validate the result.
pub fn expand_topic_name(
    input: &str,
    node_name: &str,
    namespace: &str,
) -> Result<String, &'static str> {
    if input.is_empty() {
        return Err("name must not be empty");
    }

    let expanded = if let Some(rest) = input.strip_prefix('~') {
        let base = fully_qualified_name(namespace, node_name);
        if rest.is_empty() {
            base
        } else if let Some(rest) = rest.strip_prefix('/') {
            format!("{base}/{rest}")
        } else {
            return Err("'~' must be followed by '/'");
        }
    } else if input.starts_with('/') {
        input.to_string()
    } else if namespace == "/" {
        format!("/{input}")
    } else {
        format!("{namespace}/{input}")
    };

    if expanded.ends_with('/') {
        return Err("name must not end with a slash");
    }
    if expanded[1..].split('/').all(is_valid_token) {
        Ok(expanded)
    } else {
        Err("name contains an invalid token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_names() {
        assert!(validate_node_name("talker").is_ok());
        assert!(validate_node_name("_hidden_2").is_ok());
        assert!(validate_node_name("").is_err());
        assert!(validate_node_name("2fast").is_err());
        assert!(validate_node_name("with space").is_err());
        assert!(validate_node_name("a/b").is_err());
        assert!(validate_node_name(&"n".repeat(NODE_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn namespaces() {
        assert_eq!(normalize_namespace(""), "/");
        assert!(validate_namespace("/").is_ok());
        assert!(validate_namespace("/robot/arm").is_ok());
        assert!(validate_namespace("robot").is_err());
        assert!(validate_namespace("/robot/").is_err());
        assert!(validate_namespace("/robot//arm").is_err());
        assert!(validate_namespace("/1robot").is_err());
    }

    #[test]
    fn topic_expansion() {
        assert_eq!(
            expand_topic_name("chatter", "talker", "/").as_deref(),
            Ok("/chatter")
        );
        assert_eq!(
            expand_topic_name("chatter", "talker", "/ns").as_deref(),
            Ok("/ns/chatter")
        );
        assert_eq!(
            expand_topic_name("~/status", "talker", "/ns").as_deref(),
            Ok("/ns/talker/status")
        );
        assert_eq!(
            expand_topic_name("/abs/topic", "talker", "/ns").as_deref(),
            Ok("/abs/topic")
        );
        assert!(expand_topic_name("", "talker", "/").is_err());
        assert!(expand_topic_name("bad topic", "talker", "/").is_err());
        assert!(expand_topic_name("a//b", "talker", "/").is_err());
        assert!(expand_topic_name("~status", "talker", "/").is_err());
        assert!(expand_topic_name("trailing/", "talker", "/").is_err());
    }
}
