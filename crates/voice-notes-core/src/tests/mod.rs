mod capture;
mod cpal_backend;
mod mock_backend;
mod playback;
