use point_cloud_hit_test::engine::core::app_setup::create_app;

fn main() {
    // Optional settings asset path, relative to the assets folder.
    let settings_path = std::env::args().nth(1);
    let mut app = create_app(settings_path);

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}
