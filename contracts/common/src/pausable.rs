use soroban_sdk::{symbol_short, Env, Symbol};

const PAUSED: Symbol = symbol_short!("PAUSED");

/// Halts (or resumes) the operations that honour the pause gate.
pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&PAUSED, &paused);
}

/// Returns whether the gate is closed. Contracts start unpaused.
pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}
