pub mod block;
pub mod city;
pub mod hostel;
pub mod organisation;
pub mod profile;
pub mod room_component;
pub mod room_type;
pub mod timestamp;

pub use block::{Block, BlockView};
pub use city::City;
pub use hostel::{Hostel, HostelView};
pub use organisation::Organisation;
pub use profile::{HostelProfileFields, ProfileKind};
pub use room_component::{ComponentSummary, Container, RoomComponent};
pub use room_type::{RoomType, RoomTypeImage, RoomTypeView};
