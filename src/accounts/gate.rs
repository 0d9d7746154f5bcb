use std::fmt::Debug;
use tracing::debug;
use crate::accounts::Caller;
use crate::core::library::{LibraryError, LibraryResult};

pub(crate) const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub(crate) const NOT_PERMITTED: &str = "You do not have permission to perform this action.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resource {
    Book,
    Author,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    List,
    Detail,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Detail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Allow,
    Deny,
    Abstain,
}

// AccessRule decides on a (caller, resource, action) triple or abstains
pub(crate) trait AccessRule: Debug + Sync + Send {
    fn decide(&self, caller: &Caller, resource: Resource, action: Action) -> Decision;
}

// the profile is only ever shown to its authenticated owner
#[derive(Debug)]
pub(crate) struct OwnProfileOnly;

impl AccessRule for OwnProfileOnly {
    fn decide(&self, caller: &Caller, resource: Resource, _action: Action) -> Decision {
        match (resource, caller.is_authenticated()) {
            (Resource::Profile, true) => Decision::Allow,
            (Resource::Profile, false) => Decision::Deny,
            _ => Decision::Abstain,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ReadOnlyForAnyone;

impl AccessRule for ReadOnlyForAnyone {
    fn decide(&self, _caller: &Caller, _resource: Resource, action: Action) -> Decision {
        if action.is_read() { Decision::Allow } else { Decision::Abstain }
    }
}

#[derive(Debug)]
pub(crate) struct AuthenticatedMayWrite;

impl AccessRule for AuthenticatedMayWrite {
    fn decide(&self, caller: &Caller, _resource: Resource, _action: Action) -> Decision {
        if caller.is_authenticated() { Decision::Allow } else { Decision::Deny }
    }
}

// AuthorizationGate walks its rules in order; the first decision wins and no decision denies
#[derive(Debug)]
pub(crate) struct AuthorizationGate {
    rules: Vec<Box<dyn AccessRule>>,
}

impl AuthorizationGate {
    pub fn new(rules: Vec<Box<dyn AccessRule>>) -> Self {
        Self { rules }
    }

    pub fn decide(&self, caller: &Caller, resource: Resource, action: Action) -> Decision {
        self.rules.iter()
            .map(|rule| rule.decide(caller, resource, action))
            .find(|decision| *decision != Decision::Abstain)
            .unwrap_or(Decision::Deny)
    }

    pub fn authorize(&self, caller: &Caller, resource: Resource, action: Action) -> LibraryResult<()> {
        match self.decide(caller, resource, action) {
            Decision::Allow => Ok(()),
            _ => {
                debug!("denied {:?} on {:?} for {:?}", action, resource, caller);
                if caller.is_authenticated() {
                    Err(LibraryError::forbidden(NOT_PERMITTED))
                } else {
                    Err(LibraryError::unauthorized(NOT_AUTHENTICATED))
                }
            }
        }
    }
}

impl Default for AuthorizationGate {
    fn default() -> Self {
        Self::new(vec![
            Box::new(OwnProfileOnly),
            Box::new(ReadOnlyForAnyone),
            Box::new(AuthenticatedMayWrite),
        ])
    }
}
