/// Display order assigned when a create request omits it
pub const DEFAULT_DISPLAY_ORDER: i32 = 0;
