//! Integration tests driving the full client engine against the in-process
//! mock server, over the real dispatcher and reconnect loop.

#[cfg(test)]
mod harness;
#[cfg(test)]
mod reconnect;
#[cfg(test)]
mod session_flow;
#[cfg(test)]
mod votes;
