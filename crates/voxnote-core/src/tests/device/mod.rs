mod cpal_backend;
mod sink;
mod wav;
