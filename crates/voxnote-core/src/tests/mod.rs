mod device;
mod events;
mod session;
