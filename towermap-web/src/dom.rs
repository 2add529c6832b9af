//! DOM event wiring.

use std::cell::RefCell;
use std::rc::Rc;

use towermap::{canvas_position, MapSurface, NavPanel, PointerInput, TowerMapApp};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, Touch, TouchEvent,
    Window,
};

use crate::error::{Result, WebError};

const NAV_ID: &str = "nav";
const HAMBURGER_ID: &str = "hamburger";
const ADVANCED_BUTTON_ID: &str = "advancedButton";
const COPYRIGHT_NOTICE_ID: &str = "copyrightNotice";

/// Adds an event listener that lives as long as the page.
pub fn add_listener(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<()> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();

    Ok(())
}

fn html_element(document: &Document, id: &str) -> Result<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| WebError::ElementNotFound(id.to_string()))
}

fn touch_input(canvas: &HtmlCanvasElement, event: &Event, start: bool) -> Option<PointerInput> {
    let event = event.dyn_ref::<TouchEvent>()?;
    let touches = if start {
        event.touches()
    } else {
        event.changed_touches()
    };
    let touch: Touch = touches.get(0)?;
    let position = client_to_canvas(canvas, touch.client_x(), touch.client_y());
    let touches = touches.length() as usize;

    Some(if start {
        PointerInput::TouchStart { touches, position }
    } else {
        PointerInput::TouchEnd { touches, position }
    })
}

fn mouse_input(canvas: &HtmlCanvasElement, event: &Event, down: bool) -> Option<PointerInput> {
    let event = event.dyn_ref::<MouseEvent>()?;
    let position = client_to_canvas(canvas, event.client_x(), event.client_y());

    Some(if down {
        PointerInput::MouseDown(position)
    } else {
        PointerInput::MouseUp(position)
    })
}

fn client_to_canvas(canvas: &HtmlCanvasElement, x: i32, y: i32) -> towermap::ScreenPoint {
    let rect = canvas.get_bounding_client_rect();
    canvas_position(x as f64, y as f64, rect.left(), rect.top())
}

/// Writes the attributions of the data sources into the `#copyrightNotice` element.
pub fn show_copyright_notice(document: &Document, notice: &str) {
    match html_element(document, COPYRIGHT_NOTICE_ID) {
        Ok(element) => element.set_inner_text(notice),
        Err(err) => log::warn!("Copyright notice '{notice}' is not shown: {err}"),
    }
}

/// Forwards canvas pointer events to the app.
pub fn bind_pointer_events<S: MapSurface + 'static>(
    canvas: &HtmlCanvasElement,
    app: &Rc<RefCell<TowerMapApp<S>>>,
) -> Result<()> {
    type Converter = fn(&HtmlCanvasElement, &Event, bool) -> Option<PointerInput>;
    let bindings: [(&str, Converter, bool); 4] = [
        ("mousedown", mouse_input, true),
        ("mouseup", mouse_input, false),
        ("touchstart", touch_input, true),
        ("touchend", touch_input, false),
    ];

    for (event, convert, flag) in bindings {
        let app = app.clone();
        let target = canvas.clone();
        add_listener(canvas, event, move |event| {
            if let Some(input) = convert(&target, &event, flag) {
                if let Some(change) = app.borrow_mut().handle_pointer(input) {
                    log::debug!("Pointer input {input:?} changed selection: {change:?}");
                }
            }
        })?;
    }

    Ok(())
}

fn window_size(window: &Window) -> Option<(u32, u32)> {
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width as u32, height as u32))
}

/// Resizes the map to the window now and on every window resize.
pub fn bind_resize<S: MapSurface + 'static>(
    window: &Window,
    app: &Rc<RefCell<TowerMapApp<S>>>,
) -> Result<()> {
    if let Some((width, height)) = window_size(window) {
        app.borrow_mut().resize(width, height);
    }

    let app = app.clone();
    let target = window.clone();
    add_listener(window, "resize", move |_| {
        if let Some((width, height)) = window_size(&target) {
            app.borrow_mut().resize(width, height);
        }
    })
}

fn apply_nav(nav: &NavPanel, panel: &HtmlElement, advanced_button: &HtmlElement) {
    let style = nav.style();
    let css = panel.style();
    if let Err(err) = css
        .set_property("width", style.width)
        .and_then(|_| css.set_property("transform", style.transform))
    {
        log::warn!("Failed to update nav panel style: {err:?}");
    }
    advanced_button.set_inner_text(nav.advanced_label());
}

/// Binds the hamburger and the advanced buttons to the `#nav` panel.
pub fn bind_nav_panel<S: MapSurface + 'static>(
    document: &Document,
    app: &Rc<RefCell<TowerMapApp<S>>>,
) -> Result<()> {
    let panel = html_element(document, NAV_ID)?;
    let advanced_button = html_element(document, ADVANCED_BUTTON_ID)?;
    let hamburger = html_element(document, HAMBURGER_ID)?;

    apply_nav(app.borrow().nav(), &panel, &advanced_button);

    {
        let app = app.clone();
        let panel = panel.clone();
        let button = advanced_button.clone();
        add_listener(&advanced_button, "click", move |_| {
            let mut app = app.borrow_mut();
            app.nav_mut().toggle_advanced();
            apply_nav(app.nav(), &panel, &button);
        })?;
    }

    let app = app.clone();
    add_listener(&hamburger, "click", move |_| {
        let mut app = app.borrow_mut();
        app.nav_mut().toggle_basic();
        apply_nav(app.nav(), &panel, &advanced_button);
    })
}
