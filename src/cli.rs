/// Interactive terminal menu and one-shot task runner
pub mod cli_main;
pub mod cli_plasma_ivp;
