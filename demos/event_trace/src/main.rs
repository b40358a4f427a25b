//! Headless walkthrough: builds a small composition tree, scripts some
//! input, and prints every notification plus each frame's draw submissions.
//!
//! Run with `RUST_LOG=debug` to also see the core's dispatch logging.

use std::rc::Rc;

use trellis_core::*;
use trellis_render::{Color, Compositor, GeometryBuffer, RenderBackend};
use trellis_render::{RenderError, TextureTarget};

/// Prints submissions instead of drawing them.
#[derive(Default)]
struct ConsoleBackend {
    frame: u32,
}

impl RenderBackend for ConsoleBackend {
    fn begin_frame(&mut self, viewport: Size) {
        self.frame += 1;
        println!("-- frame {} ({}x{})", self.frame, viewport.width, viewport.height);
    }

    fn submit(&mut self, buffer: &GeometryBuffer) {
        println!(
            "   submit at ({:>5.1},{:>5.1})  {} vertices  clip {:?}",
            buffer.translation.x,
            buffer.translation.y,
            buffer.vertex_count(),
            buffer.clip
        );
    }

    fn end_frame(&mut self) {}

    fn create_target(
        &mut self,
        _size: Size,
    ) -> trellis_render::Result<Box<dyn TextureTarget>> {
        Err(RenderError::NotSupported("console backend".into()))
    }

    fn bind_target(&mut self, _target: &dyn TextureTarget) {}

    fn unbind_target(&mut self) {}

    fn blit_target(&mut self, _target: &dyn TextureTarget, _dst: Rect, _clip: Option<Rect>) {}
}

fn dump_events(ui: &mut UiContext) {
    for ev in ui.drain_events() {
        println!("   event {ev:?}");
    }
}

fn main() -> trellis_core::Result<()> {
    env_logger::init();

    let mut ui = UiContext::new(Size::new(800.0, 600.0));
    let root = ui.create_element("root")?;
    ui.add_root(root)?;
    ui.set_area(root, UnitPoint::ZERO, UnitSize::rel(1.0, 1.0))?;

    let panel = ui.create_element("panel")?;
    ui.attach(root, panel)?;
    ui.set_area(panel, UnitPoint::px(100.0, 100.0), UnitSize::px(300.0, 200.0))?;
    ui.set_insets(panel, Insets::uniform(8.0))?;

    let button = ui.create_element("button")?;
    ui.attach(panel, button)?;
    ui.set_area(button, UnitPoint::px(12.0, 12.0), UnitSize::px(120.0, 32.0))?;
    ui.set_input_config(button, |i| i.auto_repeat = true)?;
    ui.set_handlers(
        button,
        InputHandlers::new().on_cursor_press(|ev| {
            println!(
                "   button pressed at local ({:.0},{:.0}){}",
                ev.local.x,
                ev.local.y,
                if ev.repeated { " (repeat)" } else { "" }
            );
            true
        }),
    )?;

    let mut compositor = Compositor::new();
    for id in [root, panel, button] {
        compositor.set_painter(
            id,
            Rc::new(|el, buf| {
                buf.push_quad(
                    Rect::from_size(el.pixel_rect().size()),
                    Color::rgba(0.2, 0.2, 0.25, 1.0),
                );
            }),
        );
    }
    let mut backend = ConsoleBackend::default();

    println!(":: initial frame");
    compositor
        .render_frame(&mut ui, &mut backend, DrawModeMask::MAIN)
        .map_err(|e| Error::NotSupported(e.to_string()))?;
    dump_events(&mut ui);

    println!(":: hold the button for half a second");
    ui.inject_cursor_move(Vec2::new(130.0, 130.0), Modifiers::default());
    ui.inject_cursor_press(CursorButton::Left, Modifiers::default());
    ui.update(0.5);
    ui.inject_cursor_release(CursorButton::Left, Modifiers::default());
    dump_events(&mut ui);

    println!(":: move the panel; geometry is reused, only translations change");
    ui.set_position(panel, UnitPoint::px(240.0, 140.0))?;
    compositor
        .render_frame(&mut ui, &mut backend, DrawModeMask::MAIN)
        .map_err(|e| Error::NotSupported(e.to_string()))?;
    dump_events(&mut ui);

    Ok(())
}
