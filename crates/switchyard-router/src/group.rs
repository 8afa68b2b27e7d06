//! Route groups: shared path prefixes and middleware stacks
//!
//! Groups live in an arena owned by the [`Router`]. A group only refers to
//! its parent by index, so the hierarchy is a tree rooted at
//! [`GroupId::ROOT`], whose middleware is the router's global middleware.

use crate::pattern::{join_paths, Pattern};
use crate::Router;
use http::Method;
use std::fmt;
use std::sync::Arc;
use switchyard_core::{Handler, Result};

/// Index of a group in the router's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

impl GroupId {
    /// The root group: empty prefix, global middleware
    pub const ROOT: GroupId = GroupId(0);

    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

struct GroupData {
    /// Canonical prefix of this group alone, empty for the root
    prefix: String,
    middleware: Vec<Arc<dyn Handler>>,
    parent: Option<GroupId>,
}

/// Arena of groups, indexed by [`GroupId`]
pub(crate) struct Groups {
    groups: Vec<GroupData>,
}

impl Groups {
    pub(crate) fn new() -> Self {
        Self {
            groups: vec![GroupData {
                prefix: String::new(),
                middleware: Vec::new(),
                parent: None,
            }],
        }
    }

    /// Create a child of `parent`. The prefix must be a valid pattern.
    pub(crate) fn create(&mut self, parent: GroupId, prefix: &str) -> Result<GroupId> {
        let own = Pattern::parse(prefix)?;
        let prefix = if own.segments().is_empty() {
            String::new()
        } else {
            own.to_string()
        };

        // Validate the combined prefix too, so a nested group cannot reuse
        // an ancestor's parameter name or follow a catch-all.
        Pattern::parse(&join_paths(&self.effective_prefix(parent), &prefix))?;

        let id = GroupId(self.groups.len());
        self.groups.push(GroupData {
            prefix,
            middleware: Vec::new(),
            parent: Some(parent),
        });
        Ok(id)
    }

    pub(crate) fn push_middleware(&mut self, id: GroupId, handler: Arc<dyn Handler>) {
        self.groups[id.0].middleware.push(handler);
    }

    /// Ancestors of `id` from the root down, `id` included
    fn lineage(&self, id: GroupId) -> Vec<&GroupData> {
        let mut lineage = Vec::new();
        let mut current = Some(id);
        while let Some(GroupId(index)) = current {
            let group = &self.groups[index];
            lineage.push(group);
            current = group.parent;
        }
        lineage.reverse();
        lineage
    }

    /// Parent's effective prefix followed by the group's own prefix
    pub(crate) fn effective_prefix(&self, id: GroupId) -> String {
        self.lineage(id)
            .iter()
            .map(|group| group.prefix.as_str())
            .collect()
    }

    /// Parent's effective middleware followed by the group's own
    pub(crate) fn effective_middleware(&self, id: GroupId) -> Vec<Arc<dyn Handler>> {
        self.lineage(id)
            .iter()
            .flat_map(|group| group.middleware.iter().cloned())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }
}

impl fmt::Debug for Groups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groups")
            .field("count", &self.groups.len())
            .finish()
    }
}

/// Registration handle for one group.
///
/// Routes registered through the handle get the group's effective prefix
/// and run the group's effective middleware before their own handlers.
/// Middleware added to a group applies to routes registered afterwards.
///
/// # Example
///
/// ```ignore
/// let mut api = router.group("/api")?;
/// api.use_middleware(auth)?;
/// api.get("/users/:id", vec![show_user])?;
///
/// let mut admin = api.group("/admin")?;
/// admin.delete("/users/:id", vec![delete_user])?;
/// ```
pub struct GroupHandle<'r> {
    router: &'r mut Router,
    id: GroupId,
}

impl<'r> GroupHandle<'r> {
    pub(crate) fn new(router: &'r mut Router, id: GroupId) -> Self {
        Self { router, id }
    }

    /// Arena id of this group
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Effective prefix, ancestors included
    pub fn prefix(&self) -> String {
        self.router.groups.effective_prefix(self.id)
    }

    /// Append middleware to this group
    pub fn use_middleware(&mut self, handler: Arc<dyn Handler>) -> Result<&mut Self> {
        self.router.add_middleware(self.id, handler)?;
        Ok(self)
    }

    /// Append several middleware, in order
    pub fn use_all(&mut self, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        for handler in handlers {
            self.router.add_middleware(self.id, handler)?;
        }
        Ok(self)
    }

    /// Create a nested group
    pub fn group(&mut self, prefix: &str) -> Result<GroupHandle<'_>> {
        let id = self.router.create_group(self.id, prefix)?;
        Ok(GroupHandle::new(self.router, id))
    }

    /// Register a route under this group
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: Vec<Arc<dyn Handler>>,
    ) -> Result<&mut Self> {
        self.router.register(self.id, method, pattern, handlers)?;
        Ok(self)
    }

    /// Register a GET route
    pub fn get(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::GET, pattern, handlers)
    }

    /// Register a POST route
    pub fn post(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::POST, pattern, handlers)
    }

    /// Register a PUT route
    pub fn put(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::PUT, pattern, handlers)
    }

    /// Register a PATCH route
    pub fn patch(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::PATCH, pattern, handlers)
    }

    /// Register a DELETE route
    pub fn delete(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::DELETE, pattern, handlers)
    }
}

impl fmt::Debug for GroupHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupHandle")
            .field("id", &self.id)
            .field("prefix", &self.prefix())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{async_trait, Context, Error, Next, PatternError};

    #[derive(Debug)]
    struct Named(&'static str);

    #[async_trait]
    impl Handler for Named {
        async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
            next.run(ctx).await
        }
    }

    fn named(name: &'static str) -> Arc<dyn Handler> {
        Arc::new(Named(name))
    }

    fn names(chain: &[Arc<dyn Handler>]) -> Vec<String> {
        chain.iter().map(|h| format!("{h:?}")).collect()
    }

    #[test]
    fn test_root_group() {
        let groups = Groups::new();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.effective_prefix(GroupId::ROOT), "");
        assert!(groups.effective_middleware(GroupId::ROOT).is_empty());
    }

    #[test]
    fn test_nested_prefix_and_middleware() {
        let mut groups = Groups::new();
        groups.push_middleware(GroupId::ROOT, named("global"));

        let api = groups.create(GroupId::ROOT, "/api/").unwrap();
        groups.push_middleware(api, named("auth"));

        let v1 = groups.create(api, "//v1").unwrap();
        groups.push_middleware(v1, named("audit"));

        assert_eq!(groups.effective_prefix(api), "/api");
        assert_eq!(groups.effective_prefix(v1), "/api/v1");
        assert_eq!(
            names(&groups.effective_middleware(v1)),
            vec![
                "Named(\"global\")",
                "Named(\"auth\")",
                "Named(\"audit\")"
            ]
        );
        assert_eq!(names(&groups.effective_middleware(api)).len(), 2);
    }

    #[test]
    fn test_empty_prefix_group() {
        let mut groups = Groups::new();
        let id = groups.create(GroupId::ROOT, "").unwrap();
        assert_eq!(groups.effective_prefix(id), "");
        let id = groups.create(GroupId::ROOT, "/").unwrap();
        assert_eq!(groups.effective_prefix(id), "");
    }

    #[test]
    fn test_invalid_prefix() {
        let mut groups = Groups::new();
        assert!(matches!(
            groups.create(GroupId::ROOT, "api"),
            Err(Error::Pattern(PatternError::MissingLeadingSlash { .. }))
        ));

        let users = groups.create(GroupId::ROOT, "/users/:id").unwrap();
        assert!(matches!(
            groups.create(users, "/friends/:id"),
            Err(Error::Pattern(PatternError::DuplicateParamName { .. }))
        ));
        assert_eq!(groups.len(), 2);
    }
}
