//! Server configuration, from command-line flags or environment variables.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "whiteboard", version, about = "Collaborative whiteboard server")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "WHITEBOARD_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory with the browser client
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Width of the surface clients draw on, used to scale previews
    #[arg(long, default_value_t = 1920)]
    pub canvas_width: u32,

    /// Height of the surface clients draw on, used to scale previews
    #[arg(long, default_value_t = 1080)]
    pub canvas_height: u32,

    /// Default page preview width
    #[arg(long, default_value_t = 320)]
    pub preview_width: u32,

    /// Default page preview height
    #[arg(long, default_value_t = 180)]
    pub preview_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
            canvas_width: 1920,
            canvas_height: 1080,
            preview_width: 320,
            preview_height: 180,
        }
    }
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
