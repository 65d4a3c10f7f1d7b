pub mod ws_providers;
