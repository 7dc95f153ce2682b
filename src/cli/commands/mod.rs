mod account;
mod rooms;

pub use account::{
    cmd_init, cmd_login, cmd_logout, cmd_onboard, cmd_register, cmd_rename, cmd_restore,
    cmd_status, cmd_whoami,
};
pub use rooms::{
    cmd_rooms_create, cmd_rooms_delete, cmd_rooms_handle, cmd_rooms_join, cmd_rooms_leave,
    cmd_rooms_list, cmd_rooms_rename, cmd_rooms_show,
};
