//! The view registry: an immutable, validated route table.
//!
//! Routes are declared once through [`RouteTableBuilder`] and validated
//! when the table is built:
//!
//! - a static path registered twice is rejected,
//! - a route name used twice is rejected,
//! - an invalid template or regex is rejected,
//! - a template that can never match because an earlier template accepts
//!   every path it accepts is rejected as unreachable,
//! - templates that overlap only partially are accepted, logged at warn
//!   level and listed by [`ViewRegistry::overlaps`]: for paths matching both,
//!   the earlier declaration wins.
//!
//! Resolution looks up static paths in a hash map first, so an exact path
//! always beats a pattern regardless of declaration order. Dynamic routes are
//! then tried in declaration order and the first structural match wins.
//! With the `cache` feature dynamic lookups go through an LRU
//! [`ResolveCache`](crate::cache::ResolveCache).

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ResolveCache};
use crate::container::Container;
use crate::error::RouteTableError;
use crate::location::normalize_path;
use crate::params::RouteParams;
use crate::pattern::{Overlap, RoutePattern};
use crate::route::{Route, ViewLoader};
use crate::{debug_log, info_log, trace_log, warn_log};
#[cfg(feature = "cache")]
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "cache")]
const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Outcome of looking up a path.
pub enum Resolution<C: Container> {
    Matched {
        route: Rc<Route<C>>,
        params: RouteParams,
    },
    NotFound,
}

impl<C: Container> Resolution<C> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }

    /// Parameters of the match, if any.
    pub fn params(&self) -> Option<&RouteParams> {
        match self {
            Resolution::Matched { params, .. } => Some(params),
            Resolution::NotFound => None,
        }
    }

    /// Name of the matched route, if it has one.
    pub fn route_name(&self) -> Option<&str> {
        match self {
            Resolution::Matched { route, .. } => route.name_str(),
            Resolution::NotFound => None,
        }
    }
}

impl<C: Container> Clone for Resolution<C> {
    fn clone(&self) -> Self {
        match self {
            Resolution::Matched { route, params } => Resolution::Matched {
                route: Rc::clone(route),
                params: params.clone(),
            },
            Resolution::NotFound => Resolution::NotFound,
        }
    }
}

impl<C: Container> fmt::Debug for Resolution<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Matched { route, params } => f
                .debug_struct("Matched")
                .field("route", route)
                .field("params", params)
                .finish(),
            Resolution::NotFound => f.write_str("NotFound"),
        }
    }
}

/// Two templates that both accept some paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOverlap {
    /// Declared first; wins for the shared paths.
    pub earlier: String,
    pub later: String,
}

/// Collects routes and validates them into a [`ViewRegistry`].
///
/// ```
/// use spa_navigator::{MemoryContainer, RouteTableBuilder, ViewContext, ViewError};
///
/// async fn page(_ctx: ViewContext<MemoryContainer>) -> Result<(), ViewError> {
///     Ok(())
/// }
///
/// let registry = RouteTableBuilder::new()
///     .register("/events", page)
///     .register("/event/:id", page)
///     .build()
///     .unwrap();
///
/// let resolution = registry.resolve("/event/abc-123");
/// assert_eq!(resolution.params().unwrap().get("id"), Some("abc-123"));
/// assert!(!registry.resolve("/place/abc-123").is_matched());
/// ```
pub struct RouteTableBuilder<C: Container> {
    routes: Vec<Route<C>>,
}

impl<C: Container> RouteTableBuilder<C> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route for `pattern` (static path or `:name` template).
    pub fn register(self, pattern: &str, loader: impl ViewLoader<C>) -> Self {
        self.route(Route::new(pattern, loader))
    }

    /// Add a fully configured route.
    pub fn route(mut self, route: Route<C>) -> Self {
        self.routes.push(route);
        self
    }

    /// Validate the routes and build the table.
    pub fn build(self) -> Result<ViewRegistry<C>, RouteTableError> {
        let mut statics: HashMap<String, usize> = HashMap::new();
        let mut names: HashMap<String, usize> = HashMap::new();
        let mut dynamic: Vec<usize> = Vec::new();
        let mut overlaps = Vec::new();

        for (index, route) in self.routes.iter().enumerate() {
            let pattern = route.pattern().map_err(Clone::clone)?;

            if let Some(name) = route.name_str() {
                if names.insert(name.to_string(), index).is_some() {
                    return Err(RouteTableError::DuplicateName {
                        name: name.to_string(),
                    });
                }
            }

            match pattern {
                RoutePattern::Static(path) => {
                    if statics.insert(path.clone(), index).is_some() {
                        return Err(RouteTableError::DuplicateStatic { path: path.clone() });
                    }
                }
                RoutePattern::Template(later) => {
                    for &earlier_index in &dynamic {
                        let Ok(RoutePattern::Template(earlier)) =
                            self.routes[earlier_index].pattern()
                        else {
                            continue;
                        };
                        match earlier.overlap(later) {
                            Overlap::Disjoint => {}
                            Overlap::Covers => {
                                return Err(RouteTableError::Unreachable {
                                    pattern: pattern.to_string(),
                                    shadowed_by: earlier.as_str().to_string(),
                                });
                            }
                            Overlap::Partial => {
                                let overlap = RouteOverlap {
                                    earlier: earlier.as_str().to_string(),
                                    later: pattern.to_string(),
                                };
                                warn_log!(
                                    "Routes '{}' and '{}' overlap; '{}' wins for shared paths",
                                    overlap.earlier,
                                    overlap.later,
                                    overlap.earlier
                                );
                                overlaps.push(overlap);
                            }
                        }
                    }
                    dynamic.push(index);
                }
                RoutePattern::Regex(_) => {
                    debug_log!(
                        "Regex route '{}' excluded from overlap analysis",
                        pattern
                    );
                    dynamic.push(index);
                }
            }
            info_log!("Registered route '{}'", pattern);
        }

        Ok(ViewRegistry {
            routes: self.routes.into_iter().map(Rc::new).collect(),
            statics,
            dynamic,
            names,
            overlaps,
            #[cfg(feature = "cache")]
            cache: RefCell::new(ResolveCache::new(DEFAULT_CACHE_CAPACITY)),
        })
    }
}

impl<C: Container> Default for RouteTableBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable route table.
pub struct ViewRegistry<C: Container> {
    routes: Vec<Rc<Route<C>>>,
    statics: HashMap<String, usize>,
    /// Indices of template and regex routes, in declaration order.
    dynamic: Vec<usize>,
    names: HashMap<String, usize>,
    overlaps: Vec<RouteOverlap>,
    #[cfg(feature = "cache")]
    cache: RefCell<Option<ResolveCache>>,
}

impl<C: Container> ViewRegistry<C> {
    pub fn builder() -> RouteTableBuilder<C> {
        RouteTableBuilder::new()
    }

    /// Resolve a path. Unknown paths yield [`Resolution::NotFound`].
    pub fn resolve(&self, path: &str) -> Resolution<C> {
        let path = normalize_path(path);

        if let Some(&index) = self.statics.get(path.as_ref()) {
            trace_log!("Static route hit for '{}'", path);
            return Resolution::Matched {
                route: Rc::clone(&self.routes[index]),
                params: RouteParams::new(),
            };
        }

        #[cfg(feature = "cache")]
        {
            let cached = self.cache.borrow_mut().as_mut().and_then(|c| c.get(&path));
            if let Some(cached) = cached {
                return self.resolution(cached);
            }
        }

        let found = self.match_dynamic(&path);

        #[cfg(feature = "cache")]
        {
            if let Some(cache) = self.cache.borrow_mut().as_mut() {
                cache.insert(path.as_ref(), found.clone());
            }
        }

        match &found {
            Some((index, params)) => {
                debug_log!(
                    "Resolved '{}' to '{}' with {} param(s)",
                    path,
                    self.routes[*index]
                        .pattern()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    params.len()
                );
            }
            None => {
                debug_log!("No route matches '{}'", path);
            }
        }
        self.resolution(found)
    }

    fn match_dynamic(&self, path: &str) -> Option<(usize, RouteParams)> {
        self.dynamic.iter().find_map(|&index| {
            let pattern = self.routes[index].pattern().ok()?;
            let params = pattern.matches(path);
            trace_log!(
                "Pattern '{}' against '{}': {}",
                pattern,
                path,
                if params.is_some() { "match" } else { "no match" }
            );
            params.map(|params| (index, params))
        })
    }

    fn resolution(&self, found: Option<(usize, RouteParams)>) -> Resolution<C> {
        match found {
            Some((index, params)) => Resolution::Matched {
                route: Rc::clone(&self.routes[index]),
                params,
            },
            None => Resolution::NotFound,
        }
    }

    /// Build the URL of a named static or template route.
    ///
    /// Returns `None` for unknown names, regex routes, or missing params.
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Option<String> {
        let route = self.route_by_name(name)?;
        match route.pattern().ok()? {
            RoutePattern::Static(path) => Some(path.clone()),
            RoutePattern::Template(template) => template.fill(params),
            RoutePattern::Regex(_) => None,
        }
    }

    pub fn route_by_name(&self, name: &str) -> Option<&Rc<Route<C>>> {
        self.names.get(name).map(|&index| &self.routes[index])
    }

    /// Partially overlapping templates, in declaration order.
    pub fn overlaps(&self) -> &[RouteOverlap] {
        &self.overlaps
    }

    pub fn routes(&self) -> impl Iterator<Item = &Rc<Route<C>>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resize the resolution cache. Zero disables it.
    #[cfg(feature = "cache")]
    pub fn set_cache_capacity(&self, capacity: usize) {
        let mut cache = self.cache.borrow_mut();
        let Some(capacity) = std::num::NonZeroUsize::new(capacity) else {
            debug_log!("Resolve cache disabled");
            *cache = None;
            return;
        };
        if let Some(existing) = cache.as_mut() {
            existing.resize(capacity);
        } else {
            *cache = ResolveCache::new(capacity.get());
        }
    }

    /// Resolution cache statistics, if the cache is enabled.
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.borrow().as_ref().map(|c| *c.stats())
    }
}

impl<C: Container> fmt::Debug for ViewRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("routes", &self.routes.len())
            .field("static", &self.statics.len())
            .field("dynamic", &self.dynamic.len())
            .field("overlaps", &self.overlaps)
            .finish_non_exhaustive()
    }
}
