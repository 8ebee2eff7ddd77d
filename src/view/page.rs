//! Embedded HTML served for the map view.
//!
//! Kept as `&'static str` so the page ships inside the binary. The map
//! configuration (center, tiles, icons, markers) is injected as a JSON
//! document that the inline script reads; the Leaflet map itself only ever
//! exists in the browser.

/// Placeholder replaced with the serialized map configuration.
pub const MAP_CONFIG_PLACEHOLDER: &str = "{{MAP_CONFIG}}";

pub const LOADING_HTML: &str = r#"<div style="padding: 20px">Loading air-quality locations…</div>"#;

pub const MAP_PAGE_HTML: &str = r#"<!doctype html>
<html lang="en">

<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Air Quality Locations</title>

  <!-- Leaflet 1.9.4 -->
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous"
    referrerpolicy="no-referrer" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"
    referrerpolicy="no-referrer"></script>

  <style>
    html, body { margin: 0; padding: 0; }
    #map { height: 100vh; width: 100%; }
  </style>
</head>

<body>
  <div id="map"></div>

  <script id="map-config" type="application/json">{{MAP_CONFIG}}</script>
  <script>
    (function () {
      const config = JSON.parse(document.getElementById("map-config").textContent);

      delete L.Icon.Default.prototype._getIconUrl;
      L.Icon.Default.mergeOptions(config.icons);

      const map = L.map("map").setView(config.center, config.zoom);
      L.tileLayer(config.tiles.url, { attribution: config.tiles.attribution }).addTo(map);

      for (const marker of config.markers) {
        const popup = document.createElement("div");
        const title = document.createElement("b");
        title.textContent = marker.title ?? "";
        popup.appendChild(title);
        popup.appendChild(document.createElement("br"));
        for (const line of marker.lines) {
          const row = document.createElement("div");
          row.textContent = line;
          popup.appendChild(row);
        }
        const leafletMarker = L.marker([marker.lat, marker.lon], { title: marker.key ?? "" })
          .bindPopup(popup)
          .addTo(map);
        if (marker.raw !== undefined) {
          leafletMarker.on("popupopen", () => console.log(marker.raw));
        }
      }
    })();
  </script>
</body>

</html>
"#;
