mod claim;
mod handshake;
mod lifecycle;
mod startup_script;
mod support;
