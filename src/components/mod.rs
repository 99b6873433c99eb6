pub mod cluster_schematic;
