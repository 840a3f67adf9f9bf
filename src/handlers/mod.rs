// handlers/mod.rs - two handler tiers
//
// Public (no session)  -> /health, /api/auth/*
// Protected (session)  -> every other /api/* route
pub mod protected;
pub mod public;
