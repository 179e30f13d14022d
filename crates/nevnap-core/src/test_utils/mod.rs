mod mock_nameday_server;

pub use mock_nameday_server::{Gate, MockNameDayServer};
