use std::process;

#[cfg(any(glx_backend, wgl_backend))]
fn main() {
    env_logger::init();

    let mut window = match glwindow::create("OpenGL Context", 400, 300) {
        Ok(window) => window,
        Err(err) => {
            log::error!("{err}");
            process::exit(1);
        },
    };

    if let Some(version) = window.version() {
        log::info!("running with OpenGL {version}");
    }

    while !window.poll_events() {
        window.swap_buffers();
    }

    window.destroy();
}

#[cfg(not(any(glx_backend, wgl_backend)))]
fn main() {
    env_logger::init();
    log::error!("glwindow was built without a native backend for this platform");
    process::exit(1);
}
