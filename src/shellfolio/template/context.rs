use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Values a template can reference with `{{name}}`.
///
/// Built fresh for every invocation and never changed during substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    pub args: Vec<String>,
    pub user: String,
    pub current_time: String,
    pub timezone: String,
    pub unix_timestamp: i64,
    pub extras: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new(args: Vec<String>, user: impl Into<String>, timezone: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            args,
            user: user.into(),
            current_time: now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            timezone: timezone.into(),
            unix_timestamp: now.timestamp(),
            extras: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// The string a `{{key}}` token resolves to. `args` joins with spaces.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "args" => Some(self.args.join(" ")),
            "user" => Some(self.user.clone()),
            "currentTime" => Some(self.current_time.clone()),
            "timezone" => Some(self.timezone.clone()),
            "unixTimestamp" => Some(self.unix_timestamp.to_string()),
            other => self.extras.get(other).cloned(),
        }
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn well_known_keys() {
        let now = Utc.with_ymd_and_hms(2024, 5, 4, 3, 2, 1).unwrap();
        let ctx = TemplateContext::new(vec!["a".into(), "b".into()], "tulio", "UTC", now);
        assert_eq!(ctx.lookup("args").as_deref(), Some("a b"));
        assert_eq!(ctx.lookup("user").as_deref(), Some("tulio"));
        assert_eq!(ctx.lookup("currentTime").as_deref(), Some("2024-05-04 03:02:01 UTC"));
        assert_eq!(ctx.lookup("unixTimestamp"), Some(now.timestamp().to_string()));
        assert_eq!(ctx.lookup("missing"), None);
    }

    #[test]
    fn extras_extend_the_context() {
        let ctx = TemplateContext::default().with_extra("version", "1.0");
        assert_eq!(ctx.lookup("version").as_deref(), Some("1.0"));
        assert_eq!(ctx.arg(0), None);
    }
}
