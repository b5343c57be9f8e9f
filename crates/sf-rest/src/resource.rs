//! Chainable resource paths.
//!
//! A [`Resource`] is an immutable list of path segments plus a handle to the
//! shared dispatcher. Extending it returns a new `Resource`; the receiver is
//! left untouched, so intermediate paths can be stored and reused.

use std::fmt;
use std::sync::Arc;

use chatter_sf_client::RequestMethod;

use crate::dispatcher::{Dispatcher, ResolvedRequest};
use crate::error::Result;
use crate::response::ApiResponse;

/// Request fields for a terminal call.
///
/// Keys are unique; inserting an existing key replaces its value in place.
/// Two keys are reserved by [`Resource::call`]: `_method` selects the HTTP
/// method and `id` is appended to the path. A key equal to one of the path
/// segments replaces that segment instead of being sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, String)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> Option<String> {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for Fields {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Fields
where
    K: Into<String>,
    V: ToString,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// A Chatter resource path under construction.
///
/// ```rust,ignore
/// // GET .../chatter/users/me
/// let me = chatter.segment("users").segment("me").get(Fields::new()).await?;
///
/// // GET .../chatter/users/005E0000000FpoxIAC
/// let other = chatter.segment("users").by("005E0000000FpoxIAC").get(Fields::new()).await?;
///
/// // POST .../chatter/feeds/news/me/feed-items
/// chatter
///     .segment("feeds").segment("news").segment("me").segment("feed_items")
///     .post([("text", "Hello world!")])
///     .await?;
/// ```
#[derive(Clone)]
pub struct Resource {
    dispatcher: Arc<Dispatcher>,
    segments: Vec<String>,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("segments", &self.segments)
            .finish_non_exhaustive()
    }
}

impl Resource {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>, segments: Vec<String>) -> Self {
        Self {
            dispatcher,
            segments,
        }
    }

    /// Extend the path by a symbolic name. Underscores become hyphens, so
    /// `feed_items` addresses `feed-items`.
    pub fn segment(&self, name: impl AsRef<str>) -> Resource {
        self.extend(name.as_ref().replace('_', "-"))
    }

    /// Extend the path by a value such as a record ID.
    ///
    /// Same as [`Resource::segment`] on the `Display` rendering, including
    /// the `_` to `-` rewrite.
    pub fn value(&self, value: impl fmt::Display) -> Resource {
        self.segment(value.to_string())
    }

    /// Alias of [`Resource::value`].
    pub fn by(&self, value: impl fmt::Display) -> Resource {
        self.value(value)
    }

    fn extend(&self, segment: String) -> Resource {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Resource::new(self.dispatcher.clone(), segments)
    }

    /// The path segments, starting with `services/data/{version}/chatter`.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The unresolved path, e.g. `services/data/v24.0/chatter/users/me`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Resolve the request a terminal call would send, without sending it.
    pub fn resolve(&self, fields: impl Into<Fields>) -> Result<ResolvedRequest> {
        self.dispatcher.resolve(&self.segments, fields.into())
    }

    /// GET this resource.
    pub async fn get(&self, fields: impl Into<Fields>) -> Result<ApiResponse> {
        self.request(RequestMethod::Get, fields).await
    }

    /// POST to this resource.
    pub async fn post(&self, fields: impl Into<Fields>) -> Result<ApiResponse> {
        self.request(RequestMethod::Post, fields).await
    }

    /// Send with an explicit method. Any `_method` field is overridden.
    pub async fn request(
        &self,
        method: RequestMethod,
        fields: impl Into<Fields>,
    ) -> Result<ApiResponse> {
        let fields = fields.into().with("_method", method);
        self.call(fields).await
    }

    /// Generic terminal call. `_method` defaults to `GET`.
    pub async fn call(&self, fields: impl Into<Fields>) -> Result<ApiResponse> {
        let request = self.resolve(fields)?;
        self.dispatcher.send(&request).await
    }
}
