mod cubemap_target;
mod mapped_storage_buffer;
mod mapped_uniform_buffer;
mod texture;
mod unmapped_storage_buffer;

pub use self::cubemap_target::*;
pub use self::mapped_storage_buffer::*;
pub use self::mapped_uniform_buffer::*;
pub use self::texture::*;
pub use self::unmapped_storage_buffer::*;
