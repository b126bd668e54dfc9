// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! The credential reveal scene.
//!
//! CredentialScene owns every moving part of the 3d reveal (phase clock,
//! card body, drag and gyro input, face textures, materials and effects)
//! and is driven by `on_tick(dt)` once per frame. What is drawn goes through
//! a RenderContext created by a RenderBackend. When the backend cannot give
//! us a context the card is shown by the 2d FlatCard instead, see
//! `mount_card_view`.
//!
//! Listener lifetime: `mount` attaches the input queue, `unmount` detaches it
//! and stops the clock. After unmount ticks and events are no-ops.

use crate::card::{CardData, Locale};
use crate::color::{parse_hsl, Rgba};
use crate::config::RevealTiming;
use crate::drag::{CardDrag, DragRelease};
use crate::effect::{HoloRing, ParticleStream, PingFrame, RadarPing};
use crate::error::RenderError;
use crate::event::{EventQueue, InputEvent};
use crate::gyro::{Gyroscope, MotionPermission};
use crate::physics::{BodyType, CardBody, RigidBody};
use crate::render::{
    CardBackTexture, CardFaceTexture, FlatCard, TextRenderer, TEXTURE_HEIGHT, TEXTURE_WIDTH,
};
use crate::reveal::{RevealClock, RevealPhase, RevealState};
use crate::shader::{iridescent_material, IridescentMaterial, MaterialParams};
use crate::share::CardActions;
use crate::util::Rand;
use glam::{Mat4, Quat, Vec2, Vec3};
use image::RgbaImage;
use log::{debug, info, warn};

pub const CAMERA_Z: f32 = 6.0;
/// edge color when the gradient start does not parse
pub const EDGE_FALLBACK: u32 = 0x8800ff;
pub const CAMERA_FOV_DEG: f32 = 45.0;

/// What one frame shows, handed to the render context.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub time: f64,
    pub phase: RevealPhase,
    pub reveal_progress: f64,
    pub card_rotation: Quat,
    pub show_card: bool,
    pub show_radar: bool,
    pub show_ring: bool,
    /// (pitch, yaw)
    pub ring_rotation: (f64, f64),
    pub pings: [PingFrame; 3],
    pub face_dirty: bool,
}

/// A live drawing surface.
pub trait RenderContext {
    fn name(&self) -> &str;
    fn draw(&mut self, scene: &CredentialScene, frame: &SceneFrame);
}

/// Something able to create a 3d drawing context.
pub trait RenderBackend {
    fn create_context(&mut self) -> Result<Box<dyn RenderContext>, RenderError>;
}

/// Cpu only backend, always available.
#[derive(Debug, Default)]
pub struct HeadlessBackend;

#[derive(Debug, Default)]
pub struct HeadlessContext {
    pub frames: u64,
    pub last_phase: Option<RevealPhase>,
}

impl RenderContext for HeadlessContext {
    fn name(&self) -> &str {
        "headless"
    }

    fn draw(&mut self, _scene: &CredentialScene, frame: &SceneFrame) {
        self.frames += 1;
        self.last_phase = Some(frame.phase);
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_context(&mut self) -> Result<Box<dyn RenderContext>, RenderError> {
        Ok(Box::new(HeadlessContext::default()))
    }
}

/// Backend that refuses, e.g. for a host without any gpu.
#[derive(Debug, Clone)]
pub struct FailingBackend(pub RenderError);

impl RenderBackend for FailingBackend {
    fn create_context(&mut self) -> Result<Box<dyn RenderContext>, RenderError> {
        Err(self.0.clone())
    }
}

pub struct CredentialScene {
    card: CardData,
    locale: Locale,
    clock: RevealClock,
    body: CardBody,
    drag: CardDrag,
    gyro: Gyroscope,
    face: CardFaceTexture,
    back: CardBackTexture,
    front_material: IridescentMaterial,
    back_material: IridescentMaterial,
    particles: ParticleStream,
    ring: HoloRing,
    ping: RadarPing,
    events: EventQueue,
    context: Option<Box<dyn RenderContext>>,
    time: f64,
    mounted: bool,
    last_release: Option<DragRelease>,
}

impl CredentialScene {
    pub fn new(card: &CardData, locale: Locale, timing: RevealTiming) -> Self {
        let from = Rgba::from_css(&card.gradient.from);
        let to = Rgba::from_css(&card.gradient.to);
        let material = || {
            iridescent_material(MaterialParams::from_gradient(
                &card.gradient.from,
                &card.gradient.to,
            ))
        };
        Self {
            card: card.clone(),
            locale,
            clock: RevealClock::new(RevealState::with_timing(
                timing.signal_lock,
                timing.materialize_end,
            )),
            body: CardBody::new(),
            drag: CardDrag::new(),
            gyro: Gyroscope::new(true),
            face: CardFaceTexture::new(card, locale),
            back: CardBackTexture::new(card, locale),
            front_material: material(),
            back_material: material(),
            particles: ParticleStream::new(from, Rand::from_now()),
            ring: HoloRing::new(from, to),
            ping: RadarPing::new(from),
            events: EventQueue::new(),
            context: None,
            time: 0.0,
            mounted: false,
            last_release: None,
        }
    }

    pub fn set_context(&mut self, ctx: Box<dyn RenderContext>) {
        self.context = Some(ctx);
    }

    pub fn context_name(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.name())
    }

    /// completion callback of the reveal, fires once per reveal
    pub fn on_reveal_complete(&mut self, f: impl FnMut() + 'static) {
        self.clock.set_callback(f);
    }

    pub fn mount(&mut self) {
        self.mounted = true;
        self.events.attach();
        info!("credential scene mounted for {}", self.card.agent_number);
    }

    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.events.detach();
        self.drag.cancel(&mut self.body);
        info!("credential scene unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Queue an input event. Returns false when nobody listens.
    pub fn dispatch(&mut self, e: InputEvent) -> bool {
        self.events.push(e)
    }

    /// Ask for gyroscope access, tilt only ever applies while interactive.
    pub fn enable_gyro(&mut self, permission: &mut dyn MotionPermission) -> bool {
        self.gyro.enable(permission)
    }

    pub fn phase(&self) -> RevealPhase {
        self.clock.phase()
    }

    fn interactive(&self) -> bool {
        self.phase() == RevealPhase::Interactive
    }

    pub fn handle_input(&mut self, e: &InputEvent) {
        match *e {
            InputEvent::DeviceOrientation { beta, gamma } => self.gyro.on_orientation(beta, gamma),
            _ if !self.interactive() => debug!("input before interactive ignored: {:?}", e),
            InputEvent::PointerDown { id, x, y, t_ms } => {
                self.drag.pointer_down(&mut self.body, id, x, y, t_ms)
            }
            InputEvent::PointerMove { id, x, y, t_ms } => {
                self.drag.pointer_move(id, x, y, t_ms);
            }
            InputEvent::PointerUp { id, .. } => {
                let r = self.drag.pointer_up(&mut self.body, id);
                if r != DragRelease::Ignored {
                    self.last_release = Some(r);
                }
            }
        }
    }

    /// Advance the whole scene by one frame.
    pub fn on_tick(&mut self, dt: f64) {
        if !self.mounted {
            return;
        }
        let dt = dt.max(0.0);
        self.time += dt;
        let phase = self.clock.tick(dt);

        for e in self.events.drain() {
            self.handle_input(&e);
        }

        self.face.update(phase, self.time);

        let progress = self.clock.state().reveal_progress as f32;
        for m in [&mut self.front_material, &mut self.back_material] {
            m.set_time(self.time as f32);
            m.set_reveal_progress(progress);
        }

        if phase == RevealPhase::Interactive {
            if !self.drag.is_dragging() {
                if self.body.body_type() != BodyType::Dynamic {
                    self.body.set_body_type(BodyType::Dynamic);
                }
                if let Some(t) = self.gyro.torque() {
                    self.body.apply_torque_impulse(t);
                }
            }
        } else if self.body.body_type() != BodyType::KinematicPosition {
            self.body.set_body_type(BodyType::KinematicPosition);
        }
        self.drag.frame(&mut self.body);
        self.body.step(dt as f32);
        self.particles.update(dt);
        self.update_transforms();

        let frame = self.frame();
        if let Some(mut ctx) = self.context.take() {
            ctx.draw(self, &frame);
            self.context = Some(ctx);
        }
    }

    fn update_transforms(&mut self) {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(
            CAMERA_FOV_DEG.to_radians(),
            crate::physics::CARD_WIDTH / crate::physics::CARD_HEIGHT,
            0.1,
            100.0,
        );
        let model = Mat4::from_quat(self.body.rotation());
        let back_model = model * Mat4::from_rotation_y(std::f32::consts::PI);
        self.front_material.set_transforms(view * model, proj);
        self.back_material.set_transforms(view * back_model, proj);
    }

    pub fn show_card(&self) -> bool {
        self.phase() != RevealPhase::SignalLock
    }

    pub fn show_radar(&self) -> bool {
        self.phase() == RevealPhase::SignalLock
    }

    pub fn show_ring(&self) -> bool {
        matches!(self.phase(), RevealPhase::Materialize | RevealPhase::Interactive)
    }

    pub fn frame(&self) -> SceneFrame {
        SceneFrame {
            time: self.time,
            phase: self.phase(),
            reveal_progress: self.clock.state().reveal_progress,
            card_rotation: self.body.rotation(),
            show_card: self.show_card(),
            show_radar: self.show_radar(),
            show_ring: self.show_ring(),
            ring_rotation: self.ring.rotation(self.time),
            pings: self.ping.frames(self.time),
            face_dirty: self.face.is_glitched(),
        }
    }

    pub fn card(&self) -> &CardData {
        &self.card
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// 0xRRGGBB of the card edges, the gradient start color
    pub fn edge_color(&self) -> u32 {
        parse_hsl(&self.card.gradient.from)
            .map(|c| Rgba::from_hsla(c).to_hex())
            .unwrap_or(EDGE_FALLBACK)
    }

    pub fn body(&self) -> &CardBody {
        &self.body
    }

    pub fn drag(&self) -> &CardDrag {
        &self.drag
    }

    pub fn face(&self) -> &CardFaceTexture {
        &self.face
    }

    pub fn back(&self) -> &CardBackTexture {
        &self.back
    }

    pub fn front_material(&self) -> &IridescentMaterial {
        &self.front_material
    }

    pub fn particles(&self) -> &ParticleStream {
        &self.particles
    }

    pub fn last_release(&self) -> Option<DragRelease> {
        self.last_release
    }

    /// Cpu shaded picture of the front face as seen head on, at card
    /// canvas resolution.
    pub fn render_preview(&self, text: Option<&TextRenderer>) -> RgbaImage {
        let (w, h) = (TEXTURE_WIDTH / 2, TEXTURE_HEIGHT / 2);
        let mut out = RgbaImage::new(w, h);
        if !self.show_card() {
            return out;
        }
        let tex = self.face.rasterize(text);
        for y in 0..h {
            for x in 0..w {
                let uv = Vec2::new(
                    (x as f32 + 0.5) / w as f32,
                    1.0 - (y as f32 + 0.5) / h as f32,
                );
                let texel = Rgba::from_u8(tex.get_pixel(x * 2, y * 2).0);
                let sample = [texel.r as f32, texel.g as f32, texel.b as f32, texel.a as f32];
                if let Some(c) = self.front_material.shade(uv, Vec3::Z, Vec3::Z, sample) {
                    let px = Rgba::new(c[0] as f64, c[1] as f64, c[2] as f64, c[3] as f64);
                    out.put_pixel(x, y, image::Rgba(px.to_u8()));
                }
            }
        }
        out
    }
}

/// The card as it ends up on screen.
pub enum CardView {
    Scene3D(Box<CredentialScene>),
    Flat(FlatCard),
}

impl CardView {
    pub fn is_3d(&self) -> bool {
        matches!(self, CardView::Scene3D(_))
    }

    pub fn card(&self) -> &CardData {
        match self {
            CardView::Scene3D(s) => s.card(),
            CardView::Flat(f) => f.card(),
        }
    }

    pub fn locale(&self) -> Locale {
        match self {
            CardView::Scene3D(s) => s.locale(),
            CardView::Flat(f) => f.locale(),
        }
    }

    /// share and download actions, identical for both views
    pub fn actions(&self, origin: &str) -> CardActions {
        CardActions::new(self.card(), self.locale(), origin)
    }
}

/// Build the 3d scene on the given backend, or the flat card when no 3d
/// context can be created. The fallback is not an error for the caller.
pub fn mount_card_view(
    card: &CardData,
    locale: Locale,
    backend: &mut dyn RenderBackend,
    timing: RevealTiming,
) -> CardView {
    match backend.create_context() {
        Ok(ctx) => {
            let mut scene = CredentialScene::new(card, locale, timing);
            info!("3d context '{}' ready", ctx.name());
            scene.set_context(ctx);
            scene.mount();
            CardView::Scene3D(Box::new(scene))
        }
        Err(e) => {
            warn!("3d unavailable ({}), showing flat card", e);
            CardView::Flat(FlatCard::new(card, locale))
        }
    }
}

#[cfg(wgpu_backend)]
mod gpu {
    use super::*;
    use crate::shader::IRIDESCENT_SHADER;

    /// Probes a real gpu: adapter, device and a compiled iridescent shader.
    #[derive(Debug, Default)]
    pub struct WgpuBackend;

    pub struct WgpuContext {
        device: wgpu::Device,
        queue: wgpu::Queue,
        _module: wgpu::ShaderModule,
        uniforms: wgpu::Buffer,
        adapter_name: String,
    }

    impl RenderContext for WgpuContext {
        fn name(&self) -> &str {
            &self.adapter_name
        }

        fn draw(&mut self, scene: &CredentialScene, _frame: &SceneFrame) {
            self.queue
                .write_buffer(&self.uniforms, 0, scene.front_material().as_bytes());
            let _ = self.device.poll(wgpu::PollType::Poll);
        }
    }

    impl RenderBackend for WgpuBackend {
        fn create_context(&mut self) -> Result<Box<dyn RenderContext>, RenderError> {
            pollster::block_on(async {
                let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                    backends: wgpu::Backends::all(),
                    ..Default::default()
                });
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::default(),
                        compatible_surface: None,
                        force_fallback_adapter: false,
                    })
                    .await
                    .map_err(|_| RenderError::NoAdapter)?;
                let adapter_name = adapter.get_info().name;
                info!("WGPU adapter found: {}", adapter_name);

                let (device, queue) = adapter
                    .request_device(&wgpu::DeviceDescriptor {
                        label: Some("SpecHack Device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: wgpu::Limits::downlevel_defaults(),
                        memory_hints: wgpu::MemoryHints::Performance,
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| RenderError::Device(e.to_string()))?;

                device.push_error_scope(wgpu::ErrorFilter::Validation);
                let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("Iridescent Shader"),
                    source: wgpu::ShaderSource::Wgsl(IRIDESCENT_SHADER.into()),
                });
                if let Some(e) = device.pop_error_scope().await {
                    return Err(RenderError::Shader(e.to_string()));
                }

                let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Iridescent Uniforms"),
                    size: std::mem::size_of::<crate::shader::IridescentUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let ctx: Box<dyn RenderContext> = Box::new(WgpuContext {
                    device,
                    queue,
                    _module: module,
                    uniforms,
                    adapter_name,
                });
                Ok::<_, RenderError>(ctx)
            })
        }
    }
}

#[cfg(wgpu_backend)]
pub use gpu::WgpuBackend;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::generate_deterministic_card;
    use crate::drag::FLIP_IMPULSE;
    use crate::gyro::NoPermissionNeeded;

    fn scene() -> CredentialScene {
        let card = generate_deterministic_card("nora vega");
        let mut s = CredentialScene::new(&card, Locale::En, RevealTiming::default());
        s.set_context(Box::new(HeadlessContext::default()));
        s.mount();
        s
    }

    fn run(s: &mut CredentialScene, secs: f64) {
        let frames = (secs * 60.0).round() as usize;
        for _ in 0..frames {
            s.on_tick(1.0 / 60.0);
        }
    }

    #[test]
    fn visibility_follows_phase() {
        let mut s = scene();
        s.on_tick(0.1);
        assert!(s.show_radar() && !s.show_card() && !s.show_ring());
        run(&mut s, 1.6);
        assert_eq!(s.phase(), RevealPhase::Materialize);
        assert!(!s.show_radar() && s.show_card() && s.show_ring());
        assert!(s.front_material().reveal_progress() > 0.0);
        run(&mut s, 2.0);
        assert_eq!(s.phase(), RevealPhase::Interactive);
        assert_eq!(s.front_material().reveal_progress(), 1.0);
        assert_eq!(s.body().body_type(), BodyType::Dynamic);
    }

    #[test]
    fn pointer_ignored_until_interactive() {
        let mut s = scene();
        s.on_tick(0.016);
        s.dispatch(InputEvent::PointerDown { id: 1, x: 0.0, y: 0.0, t_ms: 0.0 });
        s.on_tick(0.016);
        assert!(!s.drag().is_dragging());

        run(&mut s, 3.5);
        s.dispatch(InputEvent::PointerDown { id: 1, x: 0.0, y: 0.0, t_ms: 0.0 });
        s.dispatch(InputEvent::PointerMove { id: 1, x: 80.0, y: 0.0, t_ms: 10.0 });
        s.on_tick(0.016);
        assert!(s.drag().is_dragging());
        assert_eq!(s.body().body_type(), BodyType::KinematicPosition);
        s.dispatch(InputEvent::PointerUp { id: 1, x: 80.0, y: 0.0, t_ms: 12.0 });
        s.on_tick(0.016);
        assert_eq!(s.last_release(), Some(DragRelease::Flip { direction: 1.0 }));
        let w = s.body().angular_velocity().y;
        assert!(w > 0.0 && w <= FLIP_IMPULSE / s.body().inertia().y);
    }

    #[test]
    fn unmount_stops_everything() {
        let mut s = scene();
        run(&mut s, 0.5);
        let f = s.frame();
        s.unmount();
        assert!(!s.dispatch(InputEvent::PointerDown { id: 1, x: 0.0, y: 0.0, t_ms: 0.0 }));
        run(&mut s, 5.0);
        assert_eq!(s.frame(), f);
    }

    #[test]
    fn gyro_tilts_only_when_interactive() {
        let mut s = scene();
        assert!(s.enable_gyro(&mut NoPermissionNeeded));
        s.dispatch(InputEvent::DeviceOrientation { beta: Some(45.0), gamma: Some(0.0) });
        run(&mut s, 1.0);
        assert_eq!(s.body().rotation(), Quat::IDENTITY);
        run(&mut s, 3.0);
        assert!(s.body().rotation() != Quat::IDENTITY);
    }

    #[test]
    fn failing_backend_falls_back_to_flat() {
        let card = generate_deterministic_card("nora vega");
        let mut backend = FailingBackend(RenderError::NoAdapter);
        let view = mount_card_view(&card, Locale::Es, &mut backend, RevealTiming::default());
        assert!(!view.is_3d());
        assert_eq!(view.card(), &card);

        let view3d = mount_card_view(&card, Locale::Es, &mut HeadlessBackend, RevealTiming::default());
        assert!(view3d.is_3d());
        assert_eq!(
            view.actions("https://x.test").challenge_link(),
            view3d.actions("https://x.test").challenge_link()
        );
    }

    #[test]
    fn every_render_failure_degrades_to_flat() {
        let card = generate_deterministic_card("nora vega");
        for err in [
            RenderError::NoAdapter,
            RenderError::Device("lost".into()),
            RenderError::Shader("bad wgsl".into()),
        ] {
            let view = mount_card_view(
                &card,
                Locale::En,
                &mut FailingBackend(err),
                RevealTiming::default(),
            );
            assert!(!view.is_3d());
        }
    }

    #[test]
    fn edge_color_from_gradient() {
        let mut card = generate_deterministic_card("nora vega");
        card.gradient.from = "hsl(240, 100%, 50%)".into();
        let s = CredentialScene::new(&card, Locale::En, RevealTiming::default());
        assert_eq!(s.edge_color(), 0x0000ff);
        card.gradient.from = "#123456".into();
        let s = CredentialScene::new(&card, Locale::En, RevealTiming::default());
        assert_eq!(s.edge_color(), EDGE_FALLBACK);
    }

    #[test]
    fn preview_is_empty_before_materialize() {
        let mut s = scene();
        s.on_tick(0.2);
        let img = s.render_preview(None);
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }
}
