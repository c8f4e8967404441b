mod composer;
mod controls;
mod details;
