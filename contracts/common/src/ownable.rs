use soroban_sdk::{symbol_short, Address, Env, Symbol};

const OWNER: Symbol = symbol_short!("OWNER");

/// Records `owner` as the sole address allowed to call privileged entry points.
pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
}

/// Returns the recorded owner, or `None` before one has been set.
pub fn get_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OWNER)
}

/// Returns whether `caller` is the recorded owner.
///
/// This only compares addresses; callers are expected to have invoked
/// `caller.require_auth()` themselves.
pub fn is_owner(env: &Env, caller: &Address) -> bool {
    get_owner(env).is_some_and(|owner| owner == *caller)
}
