pub mod game_info;
