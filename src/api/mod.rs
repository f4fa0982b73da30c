pub mod game;

pub use game::{router as game_router, GameAppState};
