//! "Show usage in code" snippets for one configuration entry.

/// Coordinates a client needs to subscribe to one configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSnippet {
    pub app: String,
    pub env: String,
    pub dc: String,
    pub namespace: String,
    pub key: String,
}

impl UsageSnippet {
    /// Selector string shared by the agent and general clients.
    pub fn selectors(&self) -> String {
        format!("app={},dc={},env={}", self.app, self.dc, self.env)
    }

    /// Go client setup.
    pub fn go_client(&self) -> String {
        format!(
            "// 1. selectors are fixed when the client is created\n\
             c := NewClient([]string{{\"http://127.0.0.1:8800\"}}, ClientOptions{{\n\
             \x20   SelectorApp:         \"{app}\",\n\
             \x20   SelectorEnvironment: \"{env}\",\n\
             \x20   SelectorDatacenter:  \"{dc}\",\n\
             }})\n\
             // 2. register a container for the entry\n\
             atomicContainer, _ := ca.RegisterJsonContainer(\"{namespace}\", \"{key}\", new(ConfigureContainer))",
            app = self.app,
            env = self.env,
            dc = self.dc,
            namespace = self.namespace,
            key = self.key,
        )
    }

    /// Description for clients configured with plain strings.
    pub fn general_client(&self) -> String {
        format!(
            "Selectors: {}\nOptional selectors: none\nGroup: {}\nKey: {}",
            self.selectors(),
            self.namespace,
            self.key
        )
    }

    /// Command-line flags for `onlyagent`.
    pub fn agent_flags(&self) -> String {
        format!(
            "-sel {} -group {} -key {}",
            self.selectors(),
            self.namespace,
            self.key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet() -> UsageSnippet {
        UsageSnippet {
            app: "web".to_owned(),
            env: "prod".to_owned(),
            dc: "us1".to_owned(),
            namespace: "db".to_owned(),
            key: "url".to_owned(),
        }
    }

    #[test]
    fn agent_flags_order_selectors_by_name() {
        assert_eq!(
            snippet().agent_flags(),
            "-sel app=web,dc=us1,env=prod -group db -key url"
        );
    }

    #[test]
    fn go_client_names_every_coordinate() {
        let go = snippet().go_client();
        for needle in ["\"web\"", "\"prod\"", "\"us1\"", "\"db\", \"url\""] {
            assert!(go.contains(needle), "missing {needle} in:\n{go}");
        }
    }

    #[test]
    fn go_client_keeps_indentation() {
        let go = snippet().go_client();
        let lines: Vec<&str> = go.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[2], "    SelectorApp:         \"web\",");
        assert_eq!(lines[5], "})");
        assert!(!go.ends_with('\n'));
    }
}
