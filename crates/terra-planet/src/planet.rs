//! The planet session: one terrain mesh plus optional water and cloud shells.

use glam::Vec3;
use terra_sched::{ChunkReport, ChunkedScheduler, SchedulerConfig, YieldPoint};
use tracing::{info, warn};

use crate::color::{ColorStop, Gradient, Rgb, SkipReason, default_palette, map_heights};
use crate::displacement::{DisplacementEngine, TerrainSettings};
use crate::error::PlanetError;
use crate::geometry::{COLOR_ATTRIBUTE, GeometryProvider, IcosphereProvider, SphereGeometry};
use crate::overlay::{CloudSettings, CloudShell, WaterSettings, WaterShell};

/// Identifies one terrain mesh. Recreating the geometry invalidates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    generation: u64,
}

/// Which overlay shell a handle refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Water,
    Clouds,
}

/// Identifies one overlay shell. Disabling or rebuilding the shell
/// invalidates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverlayHandle {
    kind: OverlayKind,
    generation: u64,
}

impl OverlayHandle {
    pub fn kind(&self) -> OverlayKind {
        self.kind
    }
}

/// Result of a recolor pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecolorOutcome {
    /// A new color attribute was written.
    Applied { min_height: f32, max_height: f32 },
    /// The previous color attribute was left as it was.
    Skipped(SkipReason),
}

/// Result of a displacement pass and the recolor that follows it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplaceReport {
    pub pass: ChunkReport,
    pub recolor: RecolorOutcome,
}

/// Height range snapshot for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetStats {
    pub subdivisions: u32,
    pub vertex_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
}

struct TerrainMesh<M> {
    handle: MeshHandle,
    mesh: M,
    /// Positions as built, restored before every displacement pass.
    base_positions: Vec<Vec3>,
    vertex_colors: bool,
}

struct Overlay<S> {
    handle: OverlayHandle,
    shell: S,
}

/// Owns every buffer generated for one planet.
///
/// Operations take `&mut self`, so a displacement or recolor pass cannot
/// overlap another operation on the same planet.
pub struct Planet<P: GeometryProvider = IcosphereProvider> {
    provider: P,
    scheduler: ChunkedScheduler,
    terrain: Option<TerrainMesh<P::Mesh>>,
    palette: Vec<ColorStop>,
    water: Option<Overlay<WaterShell<P::Mesh>>>,
    clouds: Option<Overlay<CloudShell<P::Mesh>>>,
    next_generation: u64,
    disposed: bool,
}

impl Planet<IcosphereProvider> {
    /// Icosphere-backed planet with the default scheduling policy.
    pub fn new() -> Self {
        Self::with_provider(IcosphereProvider, SchedulerConfig::default())
    }
}

impl Default for Planet<IcosphereProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GeometryProvider> Planet<P> {
    pub fn with_provider(provider: P, scheduler: SchedulerConfig) -> Self {
        Self {
            provider,
            scheduler: ChunkedScheduler::new(scheduler),
            terrain: None,
            palette: default_palette(),
            water: None,
            clouds: None,
            next_generation: 0,
            disposed: false,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn ensure_live(&self) -> Result<(), PlanetError> {
        if self.disposed {
            return Err(PlanetError::Disposed);
        }
        Ok(())
    }

    fn terrain_for(
        &mut self,
        handle: MeshHandle,
    ) -> Result<&mut TerrainMesh<P::Mesh>, PlanetError> {
        self.ensure_live()?;
        let current = self.terrain.as_ref().map(|t| t.handle);
        match self.terrain.as_mut() {
            Some(terrain) if terrain.handle == handle => Ok(terrain),
            _ => Err(PlanetError::StaleMesh { handle, current }),
        }
    }

    /// Build a fresh undisplaced terrain sphere, replacing any previous one.
    pub fn create_geometry(&mut self, subdivisions: u32) -> Result<MeshHandle, PlanetError> {
        self.ensure_live()?;
        let mesh = self.provider.subdivided_sphere(subdivisions);
        let base_positions = mesh.positions().to_vec();
        let handle = MeshHandle {
            generation: self.next_generation(),
        };

        info!(
            subdivisions = mesh.subdivisions(),
            vertices = mesh.vertex_count(),
            "terrain geometry created"
        );

        self.terrain = Some(TerrainMesh {
            handle,
            mesh,
            base_positions,
            vertex_colors: false,
        });
        Ok(handle)
    }

    /// Displace the terrain from its base positions, then recompute normals
    /// and reapply the current palette.
    pub async fn displace<Y: YieldPoint>(
        &mut self,
        handle: MeshHandle,
        settings: &TerrainSettings,
        host: &mut Y,
    ) -> Result<DisplaceReport, PlanetError> {
        let scheduler = self.scheduler;
        let gradient = Gradient::new(self.palette.clone());
        let terrain = self.terrain_for(handle)?;

        let engine = DisplacementEngine::new(settings.clone());
        let pass = engine
            .run(&terrain.base_positions, &mut terrain.mesh, &scheduler, host)
            .await;
        terrain.mesh.recompute_normals();

        let recolor = match gradient {
            Some(gradient) => apply_gradient(terrain, &gradient, &scheduler, host).await?,
            None => RecolorOutcome::Skipped(SkipReason::NoColorStops),
        };

        info!(
            seed = settings.seed,
            vertices = pass.processed,
            slices = pass.slices,
            "terrain displaced"
        );
        Ok(DisplaceReport { pass, recolor })
    }

    /// Color the terrain by height with `stops`, which become the palette for
    /// later displacement passes. An empty set changes nothing.
    pub async fn recolor<Y: YieldPoint>(
        &mut self,
        handle: MeshHandle,
        stops: &[ColorStop],
        host: &mut Y,
    ) -> Result<RecolorOutcome, PlanetError> {
        let scheduler = self.scheduler;
        self.terrain_for(handle)?;

        let Some(gradient) = self.set_palette(stops) else {
            return Ok(RecolorOutcome::Skipped(SkipReason::NoColorStops));
        };

        let terrain = self.terrain_for(handle)?;
        apply_gradient(terrain, &gradient, &scheduler, host).await
    }

    /// Replace the palette used by later passes without recoloring. An empty
    /// set is ignored and returns `None`.
    pub fn set_palette(&mut self, stops: &[ColorStop]) -> Option<Gradient> {
        let Some(gradient) = Gradient::new(stops) else {
            warn!("palette unchanged: no color stops");
            return None;
        };
        self.palette = stops.to_vec();
        Some(gradient)
    }

    /// Create, update or drop the water shell.
    ///
    /// Returns `None` when water is disabled or no terrain exists yet. The
    /// handle is unchanged while the shell is only rescaled.
    pub fn build_or_update_water(
        &mut self,
        settings: &WaterSettings,
    ) -> Result<Option<OverlayHandle>, PlanetError> {
        self.ensure_live()?;
        if !settings.enabled {
            if self.water.take().is_some() {
                info!("water shell removed");
            }
            return Ok(None);
        }
        let Some(level) = self.terrain_level("water") else {
            return Ok(None);
        };

        if let Some(water) = self.water.as_mut() {
            if water.shell.mesh().subdivisions() == level {
                water.shell.update(settings);
                return Ok(Some(water.handle));
            }
        }

        let handle = OverlayHandle {
            kind: OverlayKind::Water,
            generation: self.next_generation(),
        };
        let shell = WaterShell::new(self.provider.subdivided_sphere(level), settings);
        info!(radius = shell.scale(), subdivisions = level, "water shell built");
        self.water = Some(Overlay { handle, shell });
        Ok(Some(handle))
    }

    /// Create, update or drop the cloud shell. The cloud noise stream is
    /// derived from `terrain`'s seed and frequency.
    pub fn build_or_update_clouds(
        &mut self,
        settings: &CloudSettings,
        terrain: &TerrainSettings,
    ) -> Result<Option<OverlayHandle>, PlanetError> {
        self.ensure_live()?;
        if !settings.enabled {
            if self.clouds.take().is_some() {
                info!("cloud shell removed");
            }
            return Ok(None);
        }
        let Some(level) = self.terrain_level("clouds") else {
            return Ok(None);
        };

        if let Some(clouds) = self.clouds.as_mut() {
            if clouds.shell.mesh().subdivisions() == level {
                clouds.shell.update(settings, terrain)?;
                return Ok(Some(clouds.handle));
            }
        }

        let handle = OverlayHandle {
            kind: OverlayKind::Clouds,
            generation: self.next_generation(),
        };
        let shell = CloudShell::new(self.provider.subdivided_sphere(level), settings, terrain)?;
        info!(
            radius = shell.scale(),
            seed = shell.seed(),
            subdivisions = level,
            "cloud shell built"
        );
        self.clouds = Some(Overlay { handle, shell });
        Ok(Some(handle))
    }

    fn terrain_level(&self, shell: &str) -> Option<u32> {
        let level = self.terrain.as_ref().map(|t| t.mesh.subdivisions());
        if level.is_none() {
            warn!(shell, "overlay skipped: no terrain geometry");
        }
        level
    }

    /// Repaint the cloud mask for `time_seconds`. Cheap enough to call once
    /// per frame.
    pub fn animate_clouds(
        &mut self,
        handle: OverlayHandle,
        time_seconds: f64,
    ) -> Result<(), PlanetError> {
        self.ensure_live()?;
        match self.clouds.as_mut() {
            Some(clouds) if clouds.handle == handle => clouds.shell.animate(time_seconds),
            _ => Err(PlanetError::StaleOverlay { kind: handle.kind }),
        }
    }

    /// Release every buffer. Later operations fail with
    /// [`PlanetError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.terrain = None;
        self.water = None;
        self.clouds = None;
        self.disposed = true;
        info!("planet disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn scheduler(&self) -> &ChunkedScheduler {
        &self.scheduler
    }

    /// Handle of the live terrain mesh.
    pub fn terrain_handle(&self) -> Option<MeshHandle> {
        self.terrain.as_ref().map(|t| t.handle)
    }

    pub fn terrain(&self) -> Option<&P::Mesh> {
        self.terrain.as_ref().map(|t| &t.mesh)
    }

    /// Positions the terrain was built with, before any displacement.
    pub fn base_positions(&self) -> Option<&[Vec3]> {
        self.terrain.as_ref().map(|t| t.base_positions.as_slice())
    }

    /// Terrain vertex colors from the last successful recolor.
    pub fn colors(&self) -> Option<&[Rgb]> {
        self.terrain.as_ref()?.mesh.color_attribute(COLOR_ATTRIBUTE)
    }

    /// Whether the terrain material should read the color attribute.
    pub fn vertex_colors_enabled(&self) -> bool {
        self.terrain.as_ref().is_some_and(|t| t.vertex_colors)
    }

    /// Stops applied by the next displacement pass.
    pub fn palette(&self) -> &[ColorStop] {
        &self.palette
    }

    pub fn water(&self) -> Option<&WaterShell<P::Mesh>> {
        self.water.as_ref().map(|w| &w.shell)
    }

    pub fn clouds(&self) -> Option<&CloudShell<P::Mesh>> {
        self.clouds.as_ref().map(|c| &c.shell)
    }

    pub fn stats(&self) -> Option<PlanetStats> {
        let mesh = &self.terrain.as_ref()?.mesh;
        let (min_radius, max_radius) = mesh
            .positions()
            .iter()
            .map(|p| p.length())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), r| (lo.min(r), hi.max(r)));
        Some(PlanetStats {
            subdivisions: mesh.subdivisions(),
            vertex_count: mesh.vertex_count(),
            min_radius,
            max_radius,
        })
    }
}

async fn apply_gradient<M, Y>(
    terrain: &mut TerrainMesh<M>,
    gradient: &Gradient,
    scheduler: &ChunkedScheduler,
    host: &mut Y,
) -> Result<RecolorOutcome, PlanetError>
where
    M: SphereGeometry,
    Y: YieldPoint,
{
    let mapped = map_heights(terrain.mesh.positions(), gradient, scheduler, host).await;
    match mapped {
        Ok(mapped) => {
            terrain.mesh.set_color_attribute(COLOR_ATTRIBUTE, mapped.buffer.colors)?;
            terrain.vertex_colors = true;
            Ok(RecolorOutcome::Applied {
                min_height: mapped.min_height,
                max_height: mapped.max_height,
            })
        }
        Err(reason) => {
            warn!(?reason, "recolor skipped, previous colors kept");
            Ok(RecolorOutcome::Skipped(reason))
        }
    }
}
