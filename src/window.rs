//! SDL2 window, input polling and frame presentation.

use std::time::Duration;

use log::debug;
use sdl2::event::{Event, WindowEvent as SdlWindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;
use thiserror::Error;

use crate::input::InputState;

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

#[derive(Debug, Error)]
#[error("SDL error: {0}")]
pub struct WindowError(String);

impl From<String> for WindowError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

fn sdl_err(err: impl std::fmt::Display) -> WindowError {
    WindowError(err.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Sleeps to hold the target frame rate and returns the elapsed time
    /// since the previous call, in milliseconds.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time.saturating_sub(self.previous_frame_time);

        let target = FRAME_TARGET_TIME as u64;
        if delta_time < target {
            std::thread::sleep(Duration::from_millis(target - delta_time));
            current_time = window.timer().ticks64();
            delta_time = current_time.saturating_sub(self.previous_frame_time);
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    input: InputState,
    width: u32,
    height: u32,
}

impl Window {
    /// Opens a resizable window with the mouse captured in relative mode.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, WindowError> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(sdl_err)?;

        let canvas = window.into_canvas().build().map_err(sdl_err)?;
        let event_pump = sdl_context.event_pump()?;
        sdl_context.mouse().set_relative_mouse_mode(true);

        Ok(Self {
            canvas,
            event_pump,
            timer_subsystem,
            input: InputState::default(),
            width,
            height,
        })
    }

    /// Drains pending events into the input snapshot.
    ///
    /// Escape or closing the window yields [`WindowEvent::Quit`]; the last
    /// resize seen in this batch yields [`WindowEvent::Resize`].
    pub fn poll_events(&mut self) -> WindowEvent {
        self.input.end_frame();
        let mut result = WindowEvent::None;

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return WindowEvent::Quit,
                Event::Window {
                    win_event: SdlWindowEvent::Resized(w, h),
                    ..
                } => {
                    if w > 0 && h > 0 {
                        result = WindowEvent::Resize(w as u32, h as u32);
                    }
                }
                Event::KeyDown {
                    keycode: Some(key), ..
                } => set_key(&mut self.input, key, true),
                Event::KeyUp {
                    keycode: Some(key), ..
                } => set_key(&mut self.input, key, false),
                Event::MouseMotion { xrel, yrel, .. } => {
                    self.input.mouse_delta.0 += xrel;
                    self.input.mouse_delta.1 += yrel;
                }
                Event::MouseWheel { y, .. } => self.input.wheel += y,
                _ => {}
            }
        }
        result
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Uploads a `width * height * 4` ARGB8888 byte buffer and shows it.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), WindowError> {
        let creator = self.canvas.texture_creator();
        let mut texture = creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, self.width, self.height)
            .map_err(sdl_err)?;
        texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(sdl_err)?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("window resized to {width}x{height}");
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}

fn set_key(input: &mut InputState, key: Keycode, pressed: bool) {
    match key {
        Keycode::W => input.forward = pressed,
        Keycode::S => input.back = pressed,
        Keycode::A => input.left = pressed,
        Keycode::D => input.right = pressed,
        Keycode::Up => input.turn_up = pressed,
        Keycode::Down => input.turn_down = pressed,
        Keycode::Left => input.turn_left = pressed,
        Keycode::Right => input.turn_right = pressed,
        _ => {}
    }
}
