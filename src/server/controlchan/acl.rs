use super::{Event, Reply, ReplyCode, error::ControlChanError, middleware::ControlChanMiddleware, registry};
use crate::options::normalize_directive;
use async_trait::async_trait;
use std::sync::Arc;

/// The configured command black- and whitelist, in normalized form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Acl {
    blacklist: Vec<String>,
    whitelist: Vec<String>,
}

impl Acl {
    pub(crate) fn new<B, W>(blacklist: B, whitelist: W) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        Acl {
            blacklist: blacklist.into_iter().map(|name| normalize_directive(name.as_ref())).collect(),
            whitelist: whitelist.into_iter().map(|name| normalize_directive(name.as_ref())).collect(),
        }
    }

    /// The refusal for a directive, or `None` if it may be used. SITE subcommands are checked as
    /// `"SITE CHMOD"` and so on.
    pub(crate) fn check(&self, directive: &str) -> Option<Reply> {
        if self.blacklist.iter().any(|d| d == directive) {
            return Some(Reply::new_with_string(ReplyCode::CommandNotImplemented, format!("Command blacklisted: {}", directive)));
        }
        if !self.whitelist.is_empty() && !self.whitelist.iter().any(|d| d == directive) {
            return Some(Reply::new_with_string(ReplyCode::CommandNotImplemented, format!("Command not whitelisted: {}", directive)));
        }
        None
    }
}

// AclMiddleware turns away commands that are unknown or not allowed on this server.
pub(crate) struct AclMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    pub acl: Arc<Acl>,
    pub next: Next,
}

#[async_trait]
impl<Next> ControlChanMiddleware for AclMiddleware<Next>
where
    Next: ControlChanMiddleware,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        if let Event::Command(cmd) = &event {
            if registry::lookup(&cmd.directive).is_none() {
                return Ok(Reply::new_with_string(
                    ReplyCode::CommandNotImplemented,
                    format!("Command not allowed: {}", cmd.directive),
                ));
            }
            if let Some(refusal) = self.acl.check(&cmd.directive) {
                return Ok(refusal);
            }
        }
        self.next.handle(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blacklist_wins_over_whitelist() {
        let acl = Acl::new(["stor"], ["STOR", "RETR"]);
        assert_eq!(
            acl.check("STOR"),
            Some(Reply::new(ReplyCode::CommandNotImplemented, "Command blacklisted: STOR"))
        );
        assert_eq!(acl.check("RETR"), None);
        assert_eq!(
            acl.check("DELE"),
            Some(Reply::new(ReplyCode::CommandNotImplemented, "Command not whitelisted: DELE"))
        );
    }

    #[test]
    fn empty_lists_allow_everything() {
        let acl = Acl::default();
        assert_eq!(acl.check("DELE"), None);
    }

    #[test]
    fn site_subcommands_are_listed_with_their_verb() {
        let acl = Acl::new(["site_chmod"], Vec::<String>::new());
        assert!(acl.check("SITE CHMOD").is_some());
        assert!(acl.check("SITE").is_none());
    }
}
