mod theme;

pub use theme::{
    docrag_theme, print_banner, print_chat_help, print_config, print_error, print_success,
    print_troubleshooting,
};
