use crate::glob::Glob;
use rescope_api::Result;
use std::fmt;
use std::sync::Arc;

type NamePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Which resource names a query selects
#[derive(Clone)]
pub enum NameQuery {
    Exact(String),
    Glob(Arc<Glob>),
    Predicate(NamePredicate),
}

impl NameQuery {
    pub fn exact(name: impl Into<String>) -> Self {
        NameQuery::Exact(name.into())
    }

    /// Compile `pattern`; fails with `PatternSyntax`
    pub fn glob(pattern: &str) -> Result<Self> {
        Ok(NameQuery::Glob(Arc::new(Glob::new(pattern)?)))
    }

    pub fn predicate(pred: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        NameQuery::Predicate(Arc::new(pred))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameQuery::Exact(exact) => exact == name,
            NameQuery::Glob(glob) => glob.matches(name),
            NameQuery::Predicate(pred) => pred(name),
        }
    }
}

impl From<Glob> for NameQuery {
    fn from(glob: Glob) -> Self {
        NameQuery::Glob(Arc::new(glob))
    }
}

impl From<Arc<Glob>> for NameQuery {
    fn from(glob: Arc<Glob>) -> Self {
        NameQuery::Glob(glob)
    }
}

impl fmt::Debug for NameQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameQuery::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            NameQuery::Glob(glob) => f.debug_tuple("Glob").field(&glob.as_str()).finish(),
            NameQuery::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
